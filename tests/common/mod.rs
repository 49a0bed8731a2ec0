#![allow(dead_code)]

pub mod test_server {
    use form_builder::forms::build_service;
    use form_builder::middleware::CorsMiddleware;
    use form_builder::server::{HttpServer, ServerHandle};
    use form_builder::storage::FormStore;
    use std::net::{SocketAddr, TcpListener};
    use std::sync::{Arc, Once};

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x10000);
        });
    }

    /// A forms server on an ephemeral localhost port, stopped on drop.
    pub struct TestServer {
        handle: Option<ServerHandle>,
        pub addr: SocketAddr,
    }

    impl TestServer {
        pub fn start(store: Arc<dyn FormStore>) -> Self {
            setup_may_runtime();
            let service = build_service(store, CorsMiddleware::default()).unwrap();
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let handle = HttpServer(service).start(addr).unwrap();
            handle.wait_ready().unwrap();
            Self {
                handle: Some(handle),
                addr,
            }
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    #[derive(Debug)]
    pub struct TestResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl TestResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body)
                .unwrap_or_else(|e| panic!("body is not JSON ({e}): {:?}", self.body))
        }
    }

    /// Send one raw request and read exactly one response.
    pub fn send_raw(addr: &SocketAddr, raw: &str) -> TestResponse {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream.write_all(raw.as_bytes()).unwrap();

        let mut buf = Vec::new();
        let mut tmp = [0u8; 4096];
        loop {
            if let Some(resp) = try_parse(&buf) {
                return resp;
            }
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        try_parse(&buf).unwrap_or_else(|| {
            panic!("incomplete response: {:?}", String::from_utf8_lossy(&buf))
        })
    }

    fn try_parse(buf: &[u8]) -> Option<TestResponse> {
        let text = std::str::from_utf8(buf).ok()?;
        let (head, body) = text.split_once("\r\n\r\n")?;
        let mut lines = head.lines();
        let status = lines.next()?.split_whitespace().nth(1)?.parse().ok()?;
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let length: usize = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        if body.len() < length {
            return None;
        }
        Some(TestResponse {
            status,
            headers,
            body: body[..length].to_string(),
        })
    }

    pub fn request(
        addr: &SocketAddr,
        method: &str,
        path: &str,
        extra_headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> TestResponse {
        let mut raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
        for (k, v) in extra_headers {
            raw.push_str(&format!("{k}: {v}\r\n"));
        }
        if let Some(body) = body {
            if !extra_headers
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            {
                raw.push_str("Content-Type: application/json\r\n");
            }
            raw.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
        } else {
            raw.push_str("\r\n");
        }
        send_raw(addr, &raw)
    }

    pub fn get(addr: &SocketAddr, path: &str) -> TestResponse {
        request(addr, "GET", path, &[], None)
    }

    pub fn post_json(addr: &SocketAddr, path: &str, body: &str) -> TestResponse {
        request(addr, "POST", path, &[], Some(body))
    }

    pub fn put_json(addr: &SocketAddr, path: &str, body: &str) -> TestResponse {
        request(addr, "PUT", path, &[], Some(body))
    }

    pub fn delete(addr: &SocketAddr, path: &str) -> TestResponse {
        request(addr, "DELETE", path, &[], None)
    }
}
