//! The duplex stream seam between a [`Session`](crate::session::Session) and
//! whatever established the connection.
//!
//! A [`Transport`] is an already-connected socket. Opening it registers the
//! socket with an explicit event-loop handle and splits it into an input half
//! and an output half. Both halves expose readiness (`readable`/`writable`)
//! and a non-blocking single-shot operation (`try_read`/`try_write`), which is
//! all the session needs to drain reads and perform one write per frame.

use std::{future::Future, io};

use tokio::{net::tcp, runtime::Handle};

pub trait InputStream {
    /// Resolves once the stream may have bytes to read, or has ended.
    fn readable(&self) -> impl Future<Output = io::Result<()>>;

    /// Reads without waiting. `WouldBlock` means nothing is buffered; `Ok(0)`
    /// means the peer closed its side.
    fn try_read(&self, buf: &mut [u8]) -> io::Result<usize>;
}

pub trait OutputStream {
    fn writable(&self) -> impl Future<Output = io::Result<()>>;

    fn try_write(&self, buf: &[u8]) -> io::Result<usize>;
}

pub trait Transport {
    type Input: InputStream;
    type Output: OutputStream;

    /// Registers the connection with `event_loop` and splits it.
    fn open(self, event_loop: &Handle) -> io::Result<(Self::Input, Self::Output)>;
}

macro_rules! impl_stream_halves {
    ($read:ty, $write:ty) => {
        impl InputStream for $read {
            async fn readable(&self) -> io::Result<()> {
                <$read>::readable(self).await
            }

            fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
                <$read>::try_read(self, buf)
            }
        }

        impl OutputStream for $write {
            async fn writable(&self) -> io::Result<()> {
                <$write>::writable(self).await
            }

            fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
                <$write>::try_write(self, buf)
            }
        }
    };
}

impl_stream_halves!(tcp::OwnedReadHalf, tcp::OwnedWriteHalf);

impl Transport for std::net::TcpStream {
    type Input = tcp::OwnedReadHalf;
    type Output = tcp::OwnedWriteHalf;

    fn open(self, event_loop: &Handle) -> io::Result<(Self::Input, Self::Output)> {
        self.set_nonblocking(true)?;
        let _guard = event_loop.enter();
        let stream = tokio::net::TcpStream::from_std(self)?;
        Ok(stream.into_split())
    }
}

#[cfg(unix)]
mod unix {
    use std::io;

    use tokio::{net::unix, runtime::Handle};

    use super::{InputStream, OutputStream, Transport};

    impl_stream_halves!(unix::OwnedReadHalf, unix::OwnedWriteHalf);

    impl Transport for std::os::unix::net::UnixStream {
        type Input = unix::OwnedReadHalf;
        type Output = unix::OwnedWriteHalf;

        fn open(self, event_loop: &Handle) -> io::Result<(Self::Input, Self::Output)> {
            self.set_nonblocking(true)?;
            let _guard = event_loop.enter();
            let stream = tokio::net::UnixStream::from_std(self)?;
            Ok(stream.into_split())
        }
    }
}
