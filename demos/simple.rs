use std::{env, ptr};

use anyhow::{Context, bail};
use libc::{c_void, intptr_t, sbrk};
use ringalloc::{
  FreeListAllocator,
  diag::{block_dump, codec_self_test},
  io::{Console, Stdio},
};
use tracing_subscriber::EnvFilter;

const DEFAULT_ARENA_SIZE: usize = 2048;

/// Arena size from `RINGALLOC_ARENA_SIZE`, or the default.
fn arena_size() -> anyhow::Result<usize> {
  match env::var("RINGALLOC_ARENA_SIZE") {
    Ok(value) => value
      .parse()
      .with_context(|| format!("invalid RINGALLOC_ARENA_SIZE: {value:?}")),
    Err(_) => Ok(DEFAULT_ARENA_SIZE),
  }
}

/// Reserves `size` bytes past the current program break.
fn reserve_arena(size: usize) -> anyhow::Result<(*mut u8, *mut u8)> {
  let increment = intptr_t::try_from(size).context("arena size does not fit intptr_t")?;
  let start = unsafe { sbrk(increment) };
  if start == usize::MAX as *mut c_void {
    bail!("sbrk failed to reserve {size} bytes");
  }
  let start = start.cast::<u8>();
  Ok((start, start.wrapping_add(size)))
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let mut console = Stdio;

  // Make sure the header encoding works before trusting the allocator.
  let ret = codec_self_test();
  console.write_string(if ret == 0 { "SUCCESS\n" } else { "FAILURE\n" })?;
  if ret > 0 {
    console.write_string("Codec self-test returned ")?;
    console.write_int(ret.into())?;
    console.write_char(b'\n')?;
    bail!("codec self-test failed");
  }

  let size = arena_size()?;
  let (start, end) = reserve_arena(size)?;
  let mut allocator = unsafe { FreeListAllocator::from_raw_parts(start, end) };

  console.write_string("Start simple test\n")?;

  let a = allocator.allocate(0x200)?;
  let b = allocator.allocate(0x100)?;

  unsafe {
    ptr::write_bytes(a.as_ptr(), 0xAA, 0x200);
    ptr::write_bytes(b.as_ptr(), 0xBB, 0x100);
    allocator.deallocate(a.as_ptr());
  }

  let c = allocator.allocate(0x100)?;
  console.write_string(if c == a {
    "Reused the first block\n"
  } else {
    "Allocated past the second block\n"
  })?;

  unsafe { allocator.deallocate(b.as_ptr()) };

  block_dump(&allocator, &mut console)?;

  Ok(())
}
