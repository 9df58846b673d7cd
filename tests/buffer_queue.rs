mod common;

use common::{ReadStep, ScriptedInput};
use pbuffer::buffer::{BufferQueue, Chunk, Chunks, DepthShrink, Maintenance, NoMaintenance};
use pbuffer::reactor::{Driver, ReadStatus};

fn unwritten_total<M: Maintenance>(queue: &BufferQueue<M>) -> usize {
    queue.iter().map(Chunk::remaining).sum()
}

#[test]
fn test_append_keeps_read_boundaries() {
    let mut queue = BufferQueue::with_maintenance(NoMaintenance);

    queue.append(b"hello").unwrap();
    queue.append(b" ").unwrap();
    queue.append(b"world").unwrap();

    assert_eq!(queue.len(), 3, "chunks should never be merged");
    assert_eq!(queue.buffered(), 11);
    assert_eq!(queue.front(), b"hello");
}

#[test]
fn test_append_empty_is_ignored() {
    let mut queue = BufferQueue::with_maintenance(NoMaintenance);

    queue.append(b"").unwrap();

    assert!(queue.is_empty());
    assert_eq!(queue.buffered(), 0);
    assert_eq!(queue.front(), b"");
}

#[test]
fn test_consume_exact_front_removes_chunk() {
    let mut queue = BufferQueue::with_maintenance(NoMaintenance);
    queue.append(b"abc").unwrap();
    queue.append(b"defg").unwrap();

    queue.consume_front(3);

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.front(), b"defg");
    assert_eq!(queue.buffered(), 4);

    queue.consume_front(4);

    assert!(queue.is_empty());
    assert_eq!(queue.buffered(), 0);
}

#[test]
fn test_partial_consume_keeps_chunk_at_front() {
    let mut queue = BufferQueue::with_maintenance(NoMaintenance);
    queue.append(b"0123456789").unwrap();
    queue.append(b"tail").unwrap();

    queue.consume_front(3);

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.front(), b"3456789");
    assert_eq!(queue.buffered(), 11);

    queue.consume_front(1);
    assert_eq!(queue.front(), b"456789");
    assert_eq!(queue.buffered(), 10);
    assert_eq!(queue.buffered(), unwritten_total(&queue));
}

#[test]
fn test_partial_consume_compacts_large_written_prefix() {
    let mut queue = BufferQueue::with_maintenance(NoMaintenance);
    queue.append(b"0123456789").unwrap();

    queue.consume_front(2);
    let chunk = queue.iter().next().unwrap();
    assert_eq!(chunk.offset(), 2, "a small prefix is only skipped");

    queue.consume_front(4);
    let chunk = queue.iter().next().unwrap();
    assert_eq!(chunk.offset(), 0, "a prefix as long as the rest is compacted");
    assert_eq!(chunk.len(), 4);
    assert_eq!(queue.front(), b"6789");
}

#[test]
fn test_consume_zero_is_noop() {
    let mut queue = BufferQueue::with_maintenance(NoMaintenance);

    queue.consume_front(0);
    queue.append(b"x").unwrap();
    queue.consume_front(0);

    assert_eq!(queue.front(), b"x");
    assert_eq!(queue.buffered(), 1);
}

#[test]
#[should_panic]
fn test_consume_past_front_panics() {
    let mut queue = BufferQueue::with_maintenance(NoMaintenance);
    queue.append(b"ab").unwrap();
    queue.append(b"cd").unwrap();

    queue.consume_front(3);
}

#[test]
fn test_chunk_shrink_to_releases_capacity() {
    let mut chunk = Chunk::with_capacity(4096).unwrap();
    assert!(chunk.capacity() >= 4096);
    assert!(chunk.is_empty());

    let mut chunk_with_data = Chunk::from_slice(&[7u8; 10]).unwrap();
    chunk_with_data.shrink_to(0);
    assert_eq!(chunk_with_data.len(), 10, "shrinking never drops unwritten bytes");
    assert_eq!(chunk_with_data.unwritten(), &[7u8; 10]);

    chunk.shrink_to(0);
    assert!(chunk.capacity() < 4096);
}

#[test]
fn test_fill_offers_exactly_the_requested_length() {
    let mut chunk = Chunk::with_capacity(4096).unwrap();
    let mut input = ScriptedInput::new(vec![ReadStep::Data(vec![9u8; 100])]);

    assert_eq!(chunk.fill_from(&mut input, 7).unwrap(), 7);

    assert_eq!(input.requests, vec![7], "spare capacity must not widen the read");
    assert_eq!(chunk.unwritten(), &[9u8; 7]);
    assert!(chunk.capacity() >= 4096, "filling never shrinks the storage");
}

#[test]
fn test_failed_fill_leaves_chunk_empty() {
    let mut chunk = Chunk::from_slice(b"stale").unwrap();
    let mut input = ScriptedInput::new(vec![ReadStep::WouldBlock]);

    assert!(chunk.fill_from(&mut input, 16).is_err());
    assert!(chunk.is_empty());
    assert_eq!(chunk.remaining(), 0);
}

#[test]
fn test_depth_shrink_targets_chunk_threshold_back() {
    let read_unit = 64;
    let queue = BufferQueue::with_maintenance(DepthShrink::with_threshold(4, read_unit / 2));
    let mut driver = Driver::with_queue(usize::MAX, read_unit, queue);

    // Every read reserves a full read unit; these come back short.
    let mut input = ScriptedInput::new(
        [5usize, 40, 6, 7, 8]
            .iter()
            .map(|&len| ReadStep::Data(vec![1u8; len]))
            .collect(),
    );
    for _ in 0..5 {
        let status = driver.read_from(&mut input, || false).unwrap();
        assert!(matches!(status, ReadStatus::Data(_)), "unexpected {status:?}");
    }

    let capacities: Vec<usize> = driver.queue().iter().map(Chunk::capacity).collect();
    assert!(
        capacities[0] < read_unit,
        "the first chunk was four back when the fourth arrived and owes 5 bytes"
    );
    assert!(
        capacities[1] >= read_unit,
        "a chunk owing more than half a read unit keeps its storage"
    );
    assert!(capacities[2] >= read_unit, "the third chunk was never four back");
    assert_eq!(driver.queue().buffered(), 66);
    assert_eq!(driver.queue().buffered(), unwritten_total(driver.queue()));
}

#[test]
fn test_depth_shrink_default_threshold() {
    let policy = DepthShrink::new(65536);

    assert_eq!(policy.threshold(), DepthShrink::DEFAULT_THRESHOLD);
    assert_eq!(DepthShrink::DEFAULT_THRESHOLD, 16);
}

#[derive(Default)]
struct Recording {
    depths: Vec<usize>,
}

impl Maintenance for Recording {
    fn after_append(&mut self, chunks: Chunks<'_>) {
        self.depths.push(chunks.len());
    }
}

#[test]
fn test_maintenance_runs_after_every_append() {
    let mut queue = BufferQueue::with_maintenance(Recording::default());

    queue.append(b"a").unwrap();
    queue.append(b"b").unwrap();
    queue.consume_front(1);
    queue.append(b"c").unwrap();

    assert_eq!(queue.maintenance().depths, vec![1, 2, 2]);
}
