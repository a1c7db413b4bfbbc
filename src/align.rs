use crate::ALIGNMENT;

/// Rounds `value` up to the arena alignment (8 bytes).
///
/// # Examples
///
/// ```rust
/// use ringalloc::align;
///
/// assert_eq!(align!(0), 0);
/// assert_eq!(align!(13), 16);
/// assert_eq!(align!(16), 16);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::ALIGNMENT - 1) & !($crate::ALIGNMENT - 1)
  };
}

/// Rounds `value` down to the arena alignment (8 bytes).
///
/// ```rust
/// use ringalloc::align_down;
///
/// assert_eq!(align_down!(13), 8);
/// assert_eq!(align_down!(16), 16);
/// ```
#[macro_export]
macro_rules! align_down {
  ($value:expr) => {
    $value & !($crate::ALIGNMENT - 1)
  };
}

/// Same as [`align!`], but returns `None` instead of overflowing.
pub fn checked_align(value: usize) -> Option<usize> {
  Some(value.checked_add(ALIGNMENT - 1)? & !(ALIGNMENT - 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align() {
    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ALIGNMENT * i + 1)..=(ALIGNMENT * (i + 1));

      let expected_alignment = ALIGNMENT * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
        assert_eq!(Some(expected), checked_align(size));
      }
    }
  }

  #[test]
  fn test_align_down() {
    for i in 0..10 {
      for size in (ALIGNMENT * i)..(ALIGNMENT * (i + 1)) {
        assert_eq!(ALIGNMENT * i, align_down!(size));
      }
    }
  }

  #[test]
  fn test_checked_align_overflow() {
    assert_eq!(checked_align(0), Some(0));
    assert_eq!(checked_align(usize::MAX - 7), Some(usize::MAX - 7));
    assert_eq!(checked_align(usize::MAX - 6), None);
    assert_eq!(checked_align(usize::MAX), None);
  }
}
