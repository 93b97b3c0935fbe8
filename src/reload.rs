//! Live-reload hub for the development server.
//!
//! A plain WebSocket endpoint on `serve.port + 1`. Served HTML pages get
//! a small client script injected that connects here and reloads the page
//! whenever the watcher finishes rebuilding. One accept thread collects
//! clients; [`ReloadHub::broadcast`] walks the list and drops closed
//! connections as it goes.

use crate::log;
use anyhow::{Context, Result};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use tungstenite::{Message, WebSocket};

pub struct ReloadHub {
    addr: SocketAddr,
    clients: Mutex<Vec<WebSocket<TcpStream>>>,
    running: AtomicBool,
}

impl ReloadHub {
    /// Bind the WebSocket endpoint and spawn the accept thread.
    pub fn start(interface: &str, port: u16) -> Result<Arc<Self>> {
        let listener = TcpListener::bind((interface, port))
            .with_context(|| format!("Failed to bind reload socket on {interface}:{port}"))?;
        let addr = listener.local_addr()?;

        let hub = Arc::new(Self {
            addr,
            clients: Mutex::new(Vec::new()),
            running: AtomicBool::new(true),
        });

        let accept_hub = Arc::clone(&hub);
        thread::spawn(move || {
            for stream in listener.incoming() {
                if !accept_hub.running.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(stream) = stream else { continue };
                if let Ok(socket) = tungstenite::accept(stream) {
                    accept_hub.lock_clients().push(socket);
                }
            }
        });

        Ok(hub)
    }

    /// Tell every connected page to reload. Dead connections are pruned.
    pub fn broadcast(&self) {
        let mut clients = self.lock_clients();
        clients.retain_mut(|socket| socket.send(Message::text("reload")).is_ok());
        if !clients.is_empty() {
            log!("reload"; "notified {} client(s)", clients.len());
        }
    }

    pub fn client_count(&self) -> usize {
        self.lock_clients().len()
    }

    /// Stop accepting connections and close the existing ones.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        // Wake the accept thread out of its blocking accept.
        let _ = TcpStream::connect(self.addr);
        for socket in self.lock_clients().iter_mut() {
            let _ = socket.close(None);
        }
    }

    fn lock_clients(&self) -> MutexGuard<'_, Vec<WebSocket<TcpStream>>> {
        match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Client script injected into served HTML pages.
pub fn client_script(port: u16) -> String {
    format!(
        r#"<script>
(function () {{
  var ws = new WebSocket('ws://' + location.hostname + ':{port}');
  ws.onmessage = function (event) {{
    if (event.data === 'reload') location.reload();
  }};
  ws.onclose = function () {{
    setTimeout(function () {{ location.reload(); }}, 1000);
  }};
}})();
</script>"#
    )
}
