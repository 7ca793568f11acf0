//! The barcode scanner boundary.
//!
//! Decoding happens elsewhere. A scanner is told to begin, works on its own
//! thread, and hands back exactly one [`ScanOutcome`] per request.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::model::ScanOutcome;

/// Something that can be asked to scan once.
pub trait Scanner {
    /// Start one scan. The outcome arrives later, out of band.
    fn begin(&mut self);
}

/// Treats each line of a reader as one decoded barcode.
///
/// A non-empty line is a payload, an empty line is a barcode without data,
/// and a read error is a scan failure. End of input closes the outcome
/// channel.
pub struct LineScanner {
    requests: Sender<()>,
}

impl LineScanner {
    /// Spawn the reader thread. Returns the scanner and the channel its
    /// outcomes arrive on.
    pub fn spawn<R>(reader: R) -> (Self, Receiver<ScanOutcome>)
    where
        R: BufRead + Send + 'static,
    {
        let (requests, pending) = mpsc::channel::<()>();
        let (outcomes, received) = mpsc::channel();

        thread::spawn(move || read_lines(reader, &pending, &outcomes));

        (Self { requests }, received)
    }
}

impl Scanner for LineScanner {
    fn begin(&mut self) {
        if self.requests.send(()).is_err() {
            tracing::debug!("scanner input closed; ignoring scan request");
        }
    }
}

fn read_lines<R: BufRead>(mut reader: R, pending: &Receiver<()>, outcomes: &Sender<ScanOutcome>) {
    for () in pending {
        let mut line = String::new();
        let outcome = match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => outcome_for_line(&line),
            Err(e) => ScanOutcome::Failed(e.to_string()),
        };

        if outcomes.send(outcome).is_err() {
            break;
        }
    }
}

fn outcome_for_line(line: &str) -> ScanOutcome {
    let payload = line.trim_end_matches(['\r', '\n']);
    if payload.is_empty() {
        ScanOutcome::Success(None)
    } else {
        ScanOutcome::Success(Some(payload.to_string()))
    }
}
