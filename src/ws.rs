//! Placeholder connection to the backend's `/ws` endpoint.
//!
//! The backend exposes the socket but no client-facing message protocol is
//! defined yet, so the connection is simply held open and incoming frames
//! are drained and discarded. Runs on its own thread with blocking reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub struct StatusSocket {
    stop: Arc<AtomicBool>,
}

impl StatusSocket {
    /// Connect in the background. Failure to connect is not an error; the
    /// client works entirely over REST.
    pub fn connect(base_url: &str) -> Self {
        // http -> ws and https -> wss ("https" loses "http", keeps the "s").
        let ws_url = format!("{}/ws", base_url.replacen("http", "ws", 1));
        let stop = Arc::new(AtomicBool::new(false));

        thread::spawn({
            let stop = Arc::clone(&stop);
            move || {
                let Ok((mut socket, _)) = tungstenite::connect(ws_url) else {
                    return;
                };
                while !stop.load(Ordering::Relaxed) {
                    match socket.read() {
                        Ok(_) => {} // no protocol defined; drop the frame
                        Err(_) => break,
                    }
                }
                let _ = socket.close(None);
            }
        });

        Self { stop }
    }

    /// Ask the reader thread to wind down. The thread is detached: a read
    /// may block until the server sends another frame or the process exits.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for StatusSocket {
    fn drop(&mut self) {
        self.shutdown();
    }
}
