#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};

/// One scripted response of [`ScriptedInput`].
#[derive(Debug)]
pub enum ReadStep {
    /// Bytes to hand out; a short request leaves the rest for the next call.
    Data(Vec<u8>),
    WouldBlock,
    Interrupted,
    Fail(ErrorKind),
    Eof,
}

/// Input that replays a script and records every requested length.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    steps: VecDeque<ReadStep>,
    pub requests: Vec<usize>,
}

impl ScriptedInput {
    pub fn new(steps: Vec<ReadStep>) -> Self {
        Self {
            steps: steps.into(),
            requests: Vec::new(),
        }
    }

    pub fn data(bytes: &[u8]) -> Self {
        Self::new(vec![ReadStep::Data(bytes.to_vec()), ReadStep::Eof])
    }

    pub fn pending(&self) -> usize {
        self.steps.len()
    }
}

impl Read for ScriptedInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.requests.push(buf.len());

        match self.steps.pop_front() {
            None | Some(ReadStep::Eof) => Ok(0),
            Some(ReadStep::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                let rest = bytes.split_off(n);
                buf[..n].copy_from_slice(&bytes);
                if !rest.is_empty() {
                    self.steps.push_front(ReadStep::Data(rest));
                }
                Ok(n)
            }
            Some(ReadStep::WouldBlock) => Err(ErrorKind::WouldBlock.into()),
            Some(ReadStep::Interrupted) => Err(ErrorKind::Interrupted.into()),
            Some(ReadStep::Fail(kind)) => Err(io::Error::new(kind, "scripted read failure")),
        }
    }
}

/// One scripted response of [`ScriptedOutput`].
#[derive(Debug)]
pub enum WriteStep {
    /// Accept at most this many bytes.
    Accept(usize),
    WouldBlock,
    Interrupted,
    Fail(ErrorKind),
}

/// Output that replays a script, then accepts everything.
#[derive(Debug, Default)]
pub struct ScriptedOutput {
    steps: VecDeque<WriteStep>,
    pub written: Vec<u8>,
    pub calls: usize,
}

impl ScriptedOutput {
    pub fn new(steps: Vec<WriteStep>) -> Self {
        Self {
            steps: steps.into(),
            written: Vec::new(),
            calls: 0,
        }
    }

    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn blocked() -> Self {
        Self::new(vec![WriteStep::WouldBlock])
    }

    pub fn push(&mut self, step: WriteStep) {
        self.steps.push_back(step);
    }
}

impl Write for ScriptedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;

        let limit = match self.steps.pop_front() {
            None => buf.len(),
            Some(WriteStep::Accept(limit)) => limit.min(buf.len()),
            Some(WriteStep::WouldBlock) => return Err(ErrorKind::WouldBlock.into()),
            Some(WriteStep::Interrupted) => return Err(ErrorKind::Interrupted.into()),
            Some(WriteStep::Fail(kind)) => {
                return Err(io::Error::new(kind, "scripted write failure"));
            }
        };

        self.written.extend_from_slice(&buf[..limit]);
        Ok(limit)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Deterministic, non-repeating test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + i / 251) as u8).collect()
}
