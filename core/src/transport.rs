//! Executing `HttpRequest`s.
//!
//! # Design
//! The session owns a `Transport` and never retries. `UreqTransport` is the
//! blocking default; it keeps one `ureq::Agent` so connections are reused,
//! and only rebuilds it when a request asks for different TLS options.
//! HTTP status codes are never turned into errors here: the envelope decides
//! what a response means.

use log::trace;
use ureq::tls::{Certificate, ClientCert, PrivateKey, TlsConfig};
use ureq::Agent;

use crate::config::TlsOptions;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// Something that can perform one HTTP round-trip.
pub trait Transport {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by `ureq`.
///
/// Bodies are read whole with no size cap; the envelope decoder passes large
/// text and binary downloads through unchanged.
#[derive(Default)]
pub struct UreqTransport {
    agent: Option<(TlsOptions, Agent)>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn agent(&mut self, tls: &TlsOptions) -> Result<&Agent, TransportError> {
        let entry = match self.agent.take() {
            Some((current, agent)) if current == *tls => (current, agent),
            _ => {
                trace!("building http agent (verify tls: {})", tls.verify);
                (tls.clone(), build_agent(tls)?)
            }
        };
        Ok(&self.agent.insert(entry).1)
    }
}

fn build_agent(tls: &TlsOptions) -> Result<Agent, TransportError> {
    let mut tls_config = TlsConfig::builder().disable_verification(!tls.verify);
    if let Some(cert) = &tls.client_cert {
        let chain = Certificate::from_pem(&std::fs::read(&cert.cert)?)?;
        let key = PrivateKey::from_pem(&std::fs::read(&cert.key)?)?;
        tls_config = tls_config.client_cert(Some(ClientCert::new_with_certs(&[chain], key)));
    }
    Ok(Agent::config_builder()
        .http_status_as_error(false)
        .tls_config(tls_config.build())
        .build()
        .new_agent())
}

impl Transport for UreqTransport {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent(&request.tls)?;

        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = agent.get(&request.url);
                for (k, v) in &request.query {
                    builder = builder.query(k, v);
                }
                for (k, v) in &request.headers {
                    builder = builder.header(k, v);
                }
                builder.call()?
            }
            HttpMethod::Post | HttpMethod::Delete => {
                let mut builder = match request.method {
                    HttpMethod::Post => agent.post(&request.url),
                    _ => agent.delete(&request.url).force_send_body(),
                };
                for (k, v) in &request.query {
                    builder = builder.query(k, v);
                }
                for (k, v) in &request.headers {
                    builder = builder.header(k, v);
                }
                match &request.body {
                    Some(RequestBody::Json(value)) => builder.send_json(value)?,
                    Some(RequestBody::Multipart(form)) => {
                        builder.content_type(form.content_type()).send(&form.encode()[..])?
                    }
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let charset = response.body().charset().map(str::to_string);
        let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
            charset,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    use super::*;

    /// Serve one response with a body of `len` bytes and return the URL.
    fn serve_once(len: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n"
            )
            .unwrap();
            stream.write_all(&vec![b'x'; len]).unwrap();
        });
        format!("http://{addr}/api/public/large")
    }

    #[test]
    fn large_bodies_are_read_whole() {
        let len = 11 * 1024 * 1024;
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: serve_once(len),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            tls: TlsOptions::default(),
        };
        let response = UreqTransport::new().execute(&request).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.len(), len);
    }
}
