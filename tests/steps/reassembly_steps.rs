//! Steps for byte-stream reassembly behavioural tests.

use cucumber::{given, then, when};

use crate::world::ReassemblyWorld;

#[given("an empty reassembly buffer")]
fn given_empty_buffer(_world: &mut ReassemblyWorld) {}

#[given(expr = "a reassembly buffer limited to {int} buffered bytes")]
fn given_limited_buffer(world: &mut ReassemblyWorld, limit: usize) {
    world.limit_buffered_bytes(limit);
}

#[when(expr = "the chunk {string} arrives at offset {int}")]
fn when_chunk_arrives(world: &mut ReassemblyWorld, data: String, offset: u64) {
    world.ingest(offset, &data);
}

#[when(expr = "the consumer reads up to {int} bytes")]
fn when_consumer_reads(world: &mut ReassemblyWorld, max: usize) { world.read(max); }

#[then(expr = "the read returns {string}")]
fn then_read_returns(world: &mut ReassemblyWorld, expected: String) {
    world.assert_read(&expected);
}

#[then("the read returns nothing")]
fn then_read_returns_nothing(world: &mut ReassemblyWorld) { world.assert_read(""); }

#[then("no segments remain")]
fn then_no_segments_remain(world: &mut ReassemblyWorld) { world.assert_drained(); }

#[then(expr = "the cursor is at offset {int}")]
fn then_cursor_at(world: &mut ReassemblyWorld, offset: u64) { world.assert_cursor(offset); }

#[then(expr = "{int} bytes are buffered")]
fn then_bytes_buffered(world: &mut ReassemblyWorld, bytes: usize) { world.assert_buffered(bytes); }

#[then("the chunk is accepted")]
fn then_chunk_accepted(world: &mut ReassemblyWorld) { world.assert_accepted(); }

#[then("the chunk is rejected for exceeding the buffer limit")]
fn then_chunk_rejected(world: &mut ReassemblyWorld) { world.assert_limit_rejection(); }
