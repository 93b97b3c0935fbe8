//! Development server with live reload.
//!
//! A lightweight HTTP server on `tiny_http` that serves the build output:
//!
//! - Static file serving with `index.html` resolution for directories
//! - A live-reload script injected into every served HTML page
//! - File watching and incremental rebuild (via the `watch` module)
//! - Graceful shutdown on Ctrl+C
//!
//! The HTTP loop runs on the main thread; the watcher and the WebSocket
//! accept loop each get a thread of their own.

use crate::{
    config::ProjectConfig,
    log,
    reload::{self, ReloadHub},
    watch::watch_for_changes_blocking,
};
use anyhow::{Context, Result};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Start the development server.
///
/// Binds the HTTP port (with auto-retry on conflict), starts the reload
/// hub one port above it, spawns the watcher thread if watching is
/// enabled, then blocks handling requests until Ctrl+C.
pub fn serve_site(config: &'static ProjectConfig) -> Result<()> {
    let interface: IpAddr = config.serve.interface.parse()?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let reload_port = addr.port().saturating_add(1);
    let hub = ReloadHub::start(&config.serve.interface, reload_port)?;

    let server_for_signal = Arc::clone(&server);
    let hub_for_signal = Arc::clone(&hub);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        hub_for_signal.stop();
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    if config.serve.watch {
        let hub_for_watch = Arc::clone(&hub);
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(config, hub_for_watch) {
                log!("watch"; "{err}");
            }
        });
    }

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &config.build.output, reload_port) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Bind the HTTP port, walking upward when the requested one is taken.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_err = None;

    for port in base_port..base_port.saturating_add(max_retries) {
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if port != base_port {
                    log!("serve"; "port {base_port} in use, using {port} instead");
                }
                return Ok((server, addr));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "no free port in {}..={}: {}",
        base_port,
        base_port.saturating_add(max_retries - 1),
        last_err.map_or_else(|| "port range empty".into(), |e| e.to_string())
    ))
}

/// Handle a single HTTP request.
///
/// Resolution order: exact file match, then `index.html` inside a
/// matching directory, then 404.
fn handle_request(request: Request, serve_root: &Path, reload_port: u16) -> Result<()> {
    match resolve_path(serve_root, request.url()) {
        Some(path) => serve_file(request, &path, reload_port),
        None => serve_not_found(request),
    }
}

/// Map a request URL onto a file inside the output tree.
///
/// URL-encoded characters are decoded and query strings stripped, so
/// cache-busting URLs like `font.woff2?t=123` resolve.
fn resolve_path(serve_root: &Path, url: &str) -> Option<PathBuf> {
    let url_path = urlencoding::decode(url)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/');
    if request_path.contains("..") {
        return None;
    }
    let local_path = serve_root.join(request_path);

    if local_path.is_file() {
        return Some(local_path);
    }
    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return Some(index_path);
        }
    }
    None
}

/// Serve a file with the right content type. HTML pages get the reload
/// client script injected on the way out.
fn serve_file(request: Request, path: &Path, reload_port: u16) -> Result<()> {
    let content_type = guess_content_type(path);
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let content = if content_type.starts_with("text/html") {
        match String::from_utf8(content) {
            Ok(html) => inject_reload_script(&html, reload_port).into_bytes(),
            Err(raw) => raw.into_bytes(),
        }
    } else {
        content
    };

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());

    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(StatusCode(404))
        .with_header(Header::from_bytes("Content-Type", "text/plain").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Insert the reload client before `</body>`, or append it when the page
/// has no closing body tag.
fn inject_reload_script(html: &str, reload_port: u16) -> String {
    let script = reload::client_script(reload_port);
    match html.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + script.len());
            out.push_str(&html[..pos]);
            out.push_str(&script);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}{script}"),
    }
}

/// Every file type the pipeline can emit; anything else is served as an
/// opaque download.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("css", "text/css; charset=utf-8"),
    ("js", "application/javascript; charset=utf-8"),
    ("mjs", "application/javascript; charset=utf-8"),
    ("json", "application/json; charset=utf-8"),
    ("map", "application/json; charset=utf-8"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("txt", "text/plain; charset=utf-8"),
];

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| ext.eq_ignore_ascii_case(known))
        .map_or("application/octet-stream", |(_, mime)| mime)
}
