use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

#[derive(Debug)]
pub(crate) struct LineTap {
    pub stream: StreamKind,
    pub line: String,
}

/// Forwards every line of `reader` to `tx` until EOF or until the receiver goes away.
///
/// Bytes are decoded lossily so a stray invalid sequence cannot stall the stream.
pub(crate) fn pump_lines<R>(
    reader: R,
    stream: StreamKind,
    tx: mpsc::Sender<LineTap>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::with_capacity(1024);
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if tx.send(LineTap { stream, line }).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        target: "speedprobe.runner",
                        stream = stream.as_str(),
                        error = %e,
                        "stream read failed"
                    );
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forwards_lines_and_handles_missing_trailing_newline() {
        let (tx, mut rx) = mpsc::channel(8);
        let input: &'static [u8] = b"one\r\ntwo\nthree";
        pump_lines(input, StreamKind::Stdout, tx).await.unwrap();

        let mut lines = Vec::new();
        while let Some(tap) = rx.recv().await {
            assert_eq!(tap.stream, StreamKind::Stdout);
            lines.push(tap.line);
        }
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let (tx, mut rx) = mpsc::channel(8);
        let input: &'static [u8] = b"ok \xff\n";
        pump_lines(input, StreamKind::Stderr, tx).await.unwrap();
        let tap = rx.recv().await.unwrap();
        assert_eq!(tap.line, "ok \u{fffd}");
    }
}
