use catalog_derive::timed;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;

struct Repository;

impl Repository {
    #[timed(Repository)]
    fn count(&self, items: &[u32]) -> usize {
        items.len()
    }

    #[timed(Repository)]
    async fn find(&self, id: u32) -> Result<u32, String> {
        if id == 0 {
            return Err("zero".to_owned());
        }
        Ok(id * 2)
    }
}

#[timed]
fn parse(value: &str) -> Result<u32, std::num::ParseIntError> {
    let parsed = value.trim().parse::<u32>()?;
    Ok(parsed)
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn subscriber(&self) -> impl Subscriber + Send + Sync + use<> {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish()
    }

    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn assert_timed(line: &str, label: &str) {
    let rest = line
        .split_once(&format!("Method {label} executed in "))
        .map(|(_, rest)| rest)
        .unwrap_or_else(|| panic!("unexpected line {line:?}"));
    let millis = rest.strip_suffix(" ms").unwrap_or_else(|| panic!("unexpected line {line:?}"));
    assert!(millis.parse::<u128>().is_ok(), "{line:?}");
    assert!(line.contains("INFO"), "{line:?}");
}

#[test]
fn timed_sync_method_returns_body_value() {
    let captured = Captured::default();
    let count = tracing::subscriber::with_default(captured.subscriber(), || Repository.count(&[1, 2, 3]));

    assert_eq!(count, 3);
    let lines = captured.lines();
    assert_eq!(lines.len(), 1);
    assert_timed(&lines[0], "Repository.count");
}

#[test]
fn timed_free_function_logs_on_both_outcomes() {
    let captured = Captured::default();
    tracing::subscriber::with_default(captured.subscriber(), || {
        assert_eq!(parse(" 42 "), Ok(42));
        assert!(parse("x").is_err());
    });

    let lines = captured.lines();
    assert_eq!(lines.len(), 2);
    assert_timed(&lines[0], "parse");
    assert_timed(&lines[1], "parse");
}

#[tokio::test]
async fn timed_async_method_logs_the_early_error_return() {
    let captured = Captured::default();
    let _guard = tracing::subscriber::set_default(captured.subscriber());

    assert_eq!(Repository.find(4).await, Ok(8));
    assert_eq!(Repository.find(0).await, Err("zero".to_owned()));

    let lines = captured.lines();
    assert_eq!(lines.len(), 2);
    assert_timed(&lines[0], "Repository.find");
    assert_timed(&lines[1], "Repository.find");
}
