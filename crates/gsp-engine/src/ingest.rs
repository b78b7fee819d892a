//! Line-oriented text formats.
//!
//! Initial graph: one `<source> <target>` per line, terminated by `S`.
//! Workload: `<Q|A|D> <source> <target>` lines, each batch terminated by `F`.
//! Both terminators are case-insensitive and blank lines are ignored.
//! Invalid UTF-8 is replaced rather than rejected, so a garbled line shows up
//! as a malformed operation instead of ending the stream.

use crate::batch::RawOperation;
use crate::error::{MalformedOperation, Result};
use crate::topology::NodeId;
use futures::{Stream, StreamExt};
use std::path::Path;
use tokio::io::AsyncRead;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tracing::warn;

pub const EDGES_END: &str = "S";
pub const BATCH_END: &str = "F";

/// One decoded line, or the I/O failure that ended the stream.
pub type LineResult = std::result::Result<String, AnyDelimiterCodecError>;

fn decode_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    if let std::borrow::Cow::Owned(_) = text {
        warn!(line = %text, "replaced invalid UTF-8 in input line");
    }
    text.trim_end_matches('\r').to_string()
}

/// Stream of `\n`-separated lines from any async reader.
pub fn lines<R>(reader: R) -> impl Stream<Item = LineResult> + Unpin
where
    R: AsyncRead + Unpin,
{
    let codec = AnyDelimiterCodec::new(b"\n".to_vec(), b"\n".to_vec());
    FramedRead::new(reader, codec).map(|frame| frame.map(|raw| decode_line(&raw)))
}

pub async fn open_lines(path: &Path) -> Result<impl Stream<Item = LineResult> + Unpin> {
    let file = tokio::fs::File::open(path).await?;
    Ok(lines(file))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLine {
    Edge(NodeId, NodeId),
    End,
    Blank,
}

pub fn parse_edge_line(line: &str) -> std::result::Result<EdgeLine, MalformedOperation> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(EdgeLine::Blank);
    }
    if line.eq_ignore_ascii_case(EDGES_END) {
        return Ok(EdgeLine::End);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [source, target] => {
            let parse = |f: &str| {
                f.parse::<NodeId>()
                    .map_err(|_| MalformedOperation::InvalidNode(f.to_string()))
            };
            Ok(EdgeLine::Edge(parse(*source)?, parse(*target)?))
        }
        other => Err(MalformedOperation::Arity(other.len())),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    pub edges: Vec<(NodeId, NodeId)>,
    /// Lines that were not a valid edge
    pub rejected: usize,
    /// False when input ended before the `S` line
    pub terminated: bool,
}

/// Read edges up to and including the `S` line, leaving the rest of the
/// stream for the caller.
pub async fn read_edge_list<S>(lines: &mut S) -> Result<EdgeList>
where
    S: Stream<Item = LineResult> + Unpin,
{
    let mut list = EdgeList::default();

    while let Some(line) = lines.next().await {
        let line = line?;
        match parse_edge_line(&line) {
            Ok(EdgeLine::Edge(s, t)) => list.edges.push((s, t)),
            Ok(EdgeLine::Blank) => {}
            Ok(EdgeLine::End) => {
                list.terminated = true;
                break;
            }
            Err(reason) => {
                warn!(line = %line, %reason, "invalid edge line");
                list.rejected += 1;
            }
        }
    }

    Ok(list)
}

/// Collects workload lines into batches.
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    pending: Vec<RawOperation>,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns the finished batch when the line is `F`.
    pub fn push_line(&mut self, line: &str) -> Option<Vec<RawOperation>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.eq_ignore_ascii_case(BATCH_END) {
            return Some(std::mem::take(&mut self.pending));
        }
        self.pending.push(RawOperation::from_line(line));
        None
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Operations left over after the last `F`, if any.
    pub fn finish(&mut self) -> Option<Vec<RawOperation>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Next batch from the stream. At end of input, yields any unterminated
/// trailing operations once, then `None`.
pub async fn next_batch<S>(
    lines: &mut S,
    acc: &mut BatchAccumulator,
) -> Result<Option<Vec<RawOperation>>>
where
    S: Stream<Item = LineResult> + Unpin,
{
    while let Some(line) = lines.next().await {
        if let Some(batch) = acc.push_line(&line?) {
            return Ok(Some(batch));
        }
    }
    Ok(acc.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edge_line() {
        assert_eq!(parse_edge_line("1 2"), Ok(EdgeLine::Edge(1, 2)));
        assert_eq!(parse_edge_line("  3\t4 "), Ok(EdgeLine::Edge(3, 4)));
        assert_eq!(parse_edge_line("s"), Ok(EdgeLine::End));
        assert_eq!(parse_edge_line(""), Ok(EdgeLine::Blank));
        assert_eq!(parse_edge_line("1"), Err(MalformedOperation::Arity(1)));
        assert_eq!(
            parse_edge_line("1 b"),
            Err(MalformedOperation::InvalidNode("b".into()))
        );
    }

    #[tokio::test]
    async fn test_edge_list_stops_at_terminator() {
        let input = b"1 2\n2 3\n\nbad line here\n3 x\nS\nQ 1 3\nF\n";
        let mut stream = lines(&input[..]);

        let list = read_edge_list(&mut stream).await.unwrap();
        assert_eq!(list.edges, vec![(1, 2), (2, 3)]);
        assert_eq!(list.rejected, 2);
        assert!(list.terminated);

        // The workload that follows is still on the stream
        let mut acc = BatchAccumulator::new();
        let batch = next_batch(&mut stream, &mut acc).await.unwrap().unwrap();
        assert_eq!(batch, vec![RawOperation::from_line("Q 1 3")]);
        assert_eq!(next_batch(&mut stream, &mut acc).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_edge_list_without_terminator() {
        let input = b"5 6\r\n6 7\r\n";
        let list = read_edge_list(&mut lines(&input[..])).await.unwrap();
        assert_eq!(list.edges, vec![(5, 6), (6, 7)]);
        assert!(!list.terminated);
    }

    #[tokio::test]
    async fn test_batches_split_on_f() {
        let input = b"A 1 2\nQ 1 2\nF\n\nf\nD 1 2\nQ 1 2\n";
        let mut stream = lines(&input[..]);
        let mut acc = BatchAccumulator::new();

        let first = next_batch(&mut stream, &mut acc).await.unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].to_string(), "A 1 2");

        let empty = next_batch(&mut stream, &mut acc).await.unwrap().unwrap();
        assert!(empty.is_empty());

        // Trailing batch without F still comes through
        let last = next_batch(&mut stream, &mut acc).await.unwrap().unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(next_batch(&mut stream, &mut acc).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_stays_in_batch() {
        let input = b"\xff 1 2\nQ 1 1\nF\nQ 2 2\nF\n";
        let mut stream = lines(&input[..]);
        let mut acc = BatchAccumulator::new();

        let batch = next_batch(&mut stream, &mut acc).await.unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch[0].parse(),
            Err(MalformedOperation::UnknownTag("\u{FFFD}".into()))
        );
        assert_eq!(batch[1], RawOperation::from_line("Q 1 1"));

        // The stream keeps going after the bad line
        let next = next_batch(&mut stream, &mut acc).await.unwrap().unwrap();
        assert_eq!(next, vec![RawOperation::from_line("Q 2 2")]);
        assert_eq!(next_batch(&mut stream, &mut acc).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_batch_is_skipped_by_engine() {
        let input = b"Q 1 1\n\xff\xfe 1 2\nQ 2 2\nF\n";
        let mut acc = BatchAccumulator::new();
        let batch = next_batch(&mut lines(&input[..]), &mut acc)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.len(), 3);

        let engine = crate::GspEngine::with_log(std::sync::Arc::new(crate::NullLog));
        assert_eq!(engine.process_batch(&batch), vec![0, 0]);
    }

    #[tokio::test]
    async fn test_edge_list_rejects_invalid_utf8_line() {
        let input = b"1 2\n\xff 3\n2 3\r\nS\n";
        let list = read_edge_list(&mut lines(&input[..])).await.unwrap();
        assert_eq!(list.edges, vec![(1, 2), (2, 3)]);
        assert_eq!(list.rejected, 1);
        assert!(list.terminated);
    }

    #[test]
    fn test_accumulator_keeps_malformed_lines() {
        let mut acc = BatchAccumulator::new();
        assert_eq!(acc.push_line("X 1 2"), None);
        assert_eq!(acc.push_line("Q 1"), None);
        assert_eq!(acc.pending(), 2);

        let batch = acc.push_line("F").unwrap();
        assert!(batch.iter().all(|op| op.parse().is_err()));
        assert_eq!(acc.finish(), None);
    }
}
