//! In-memory transport and observer used by the unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    io,
    rc::Rc,
};

use tokio::runtime::Handle;

use crate::{
    codec::Message,
    observer::Observer,
    transport::{InputStream, OutputStream, Transport},
};

/// A transport whose reads are scripted up front and whose writes are
/// captured. Clones share the same script, so a test can keep one clone
/// for inspection after handing another to a session.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    reads: Rc<RefCell<VecDeque<io::Result<Vec<u8>>>>>,
    written: Rc<RefCell<Vec<Vec<u8>>>>,
    write_limit: Rc<Cell<Option<usize>>>,
    broken_output: bool,
    fail_open: bool,
}

impl ScriptedTransport {
    pub(crate) fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_write_limit(self, limit: usize) -> Self {
        self.write_limit.set(Some(limit));
        self
    }

    pub(crate) fn with_broken_output(mut self) -> Self {
        self.broken_output = true;
        self
    }

    pub(crate) fn push_read(&self, bytes: &[u8]) {
        self.reads.borrow_mut().push_back(Ok(bytes.to_vec()));
    }

    pub(crate) fn push_error(&self, kind: io::ErrorKind) {
        self.reads
            .borrow_mut()
            .push_back(Err(io::Error::new(kind, "scripted failure")));
    }

    pub(crate) fn pending_reads(&self) -> usize {
        self.reads.borrow().len()
    }

    pub(crate) fn written(&self) -> Vec<Vec<u8>> {
        self.written.borrow().clone()
    }
}

pub(crate) struct ScriptedInput {
    reads: Rc<RefCell<VecDeque<io::Result<Vec<u8>>>>>,
}

pub(crate) struct ScriptedOutput {
    written: Rc<RefCell<Vec<Vec<u8>>>>,
    write_limit: Option<usize>,
    broken: bool,
}

impl Transport for ScriptedTransport {
    type Input = ScriptedInput;
    type Output = ScriptedOutput;

    fn open(self, _event_loop: &Handle) -> io::Result<(Self::Input, Self::Output)> {
        if self.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "scripted open failure",
            ));
        }

        Ok((
            ScriptedInput { reads: self.reads },
            ScriptedOutput {
                written: self.written,
                write_limit: self.write_limit.get(),
                broken: self.broken_output,
            },
        ))
    }
}

impl InputStream for ScriptedInput {
    async fn readable(&self) -> io::Result<()> {
        if self.reads.borrow().is_empty() {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reads = self.reads.borrow_mut();
        match reads.pop_front() {
            Some(Ok(mut bytes)) => {
                let count = bytes.len().min(buf.len());
                buf[..count].copy_from_slice(&bytes[..count]);
                if count < bytes.len() {
                    reads.push_front(Ok(bytes.split_off(count)));
                }
                Ok(count)
            }
            Some(Err(err)) => Err(err),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }
}

impl OutputStream for ScriptedOutput {
    async fn writable(&self) -> io::Result<()> {
        Ok(())
    }

    fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
        if self.broken {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let count = self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        self.written.borrow_mut().push(buf[..count].to_vec());
        Ok(count)
    }
}

#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) messages: RefCell<Vec<Message>>,
    pub(crate) faults: RefCell<Vec<io::ErrorKind>>,
}

impl Observer for Recorder {
    fn message_received(&self, message: Message) {
        self.messages.borrow_mut().push(message);
    }

    fn stream_fault(&self, error: &io::Error) {
        self.faults.borrow_mut().push(error.kind());
    }
}
