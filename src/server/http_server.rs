use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Request headers parsed per request; extra headers fail the request.
pub const MAX_REQUEST_HEADERS: usize = 32;

/// Thin typed wrapper over `may_minihttp::HttpServerWithHeaders`.
pub struct HttpServer<T>(pub T);

/// Handle to a running server coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listen address until a TCP connect succeeds.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the listener is not accepting after ~1s.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..200 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the accept loop and wait for it to exit.
    pub fn stop(self) {
        info!(addr = %self.addr, "Stopping HTTP server");
        // SAFETY: cancel is unsafe in may because the target coroutine must not
        // hold resources that rely on running to completion. The accept loop
        // owns only its listener, which is dropped on unwind.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the server coroutine exits.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind and start serving on `addr`.
    ///
    /// # Errors
    ///
    /// Fails when the address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        // Browsers and proxies routinely send more than 16 request headers.
        let handle = HttpServerWithHeaders::<_, MAX_REQUEST_HEADERS>(self.0).start(addr)?;
        info!(addr = %addr, "HTTP server listening");
        Ok(ServerHandle { addr, handle })
    }
}
