//! Scriptable stand-in for the automation object and the pipe server.
//!
//! The server side keeps the reference count and a log of every remote
//! call, so tests can check that nothing leaks and that released handles
//! never reach the remote object.

use std::{
    collections::{HashMap, HashSet},
    io::{Cursor, Read, Write},
    sync::{Arc, Mutex},
};

use crate::runinfo::{
    remote::{RemoteError, RemoteFactory, RemoteObject, Variant},
    stdio::{PipeDialer, StdStream},
};

#[derive(Default)]
struct ServerState {
    ref_count: u32,
    release_count: u32,
    properties: HashMap<String, Variant>,
    env: Vec<(String, String)>,
    calls: Vec<String>,
    failing: HashSet<String>,
    pipe_names: HashMap<StdStream, String>,
}

/// The remote side of the mock object.
#[derive(Clone)]
pub struct MockServer {
    state: Arc<Mutex<ServerState>>,
}

impl MockServer {
    pub fn new() -> Self {
        let mut state = ServerState::default();
        state.pipe_names.insert(StdStream::Stdin, "prison_mock_in".to_string());
        state.pipe_names.insert(StdStream::Stdout, "prison_mock_out".to_string());
        state.pipe_names.insert(StdStream::Stderr, "prison_mock_err".to_string());
        MockServer { state: Arc::new(Mutex::new(state)) }
    }

    fn access<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ServerState) -> R,
    {
        let mut guard = self.state.lock().expect("mock state poisoned");
        f(&mut guard)
    }

    /// Make every later call to the member fail.
    pub fn fail_on(&self, member: &str) {
        self.access(|s| s.failing.insert(member.to_string()));
    }

    pub fn set_property(&self, name: &str, value: Variant) {
        self.access(|s| s.properties.insert(name.to_string(), value));
    }

    pub fn set_pipe_name(&self, stream: StdStream, name: &str) {
        self.access(|s| s.pipe_names.insert(stream, name.to_string()));
    }

    pub fn pipe_name(&self, stream: StdStream) -> String {
        self.access(|s| s.pipe_names.get(&stream).cloned().unwrap_or_default())
    }

    pub fn ref_count(&self) -> u32 {
        self.access(|s| s.ref_count)
    }

    /// Number of reference decrements the object has received.
    pub fn release_count(&self) -> u32 {
        self.access(|s| s.release_count)
    }

    pub fn calls(&self) -> Vec<String> {
        self.access(|s| s.calls.clone())
    }

    pub fn env(&self) -> Vec<(String, String)> {
        self.access(|s| s.env.clone())
    }

    fn record(&self, call: String, member: &str) -> Result<(), RemoteError> {
        self.access(|s| {
            s.calls.push(call);
            if s.failing.contains(member) {
                Err(RemoteError::with_code(0x80020009u32 as i32, "exception occurred"))
            } else {
                Ok(())
            }
        })
    }

    fn decrement(&self) -> u32 {
        self.access(|s| {
            assert!(s.ref_count > 0, "reference count underflow");
            s.ref_count -= 1;
            s.release_count += 1;
            s.ref_count
        })
    }
}


pub struct MockFactory {
    server: MockServer,
    fail: bool,
}

impl MockFactory {
    pub fn new(server: &MockServer) -> Self {
        MockFactory { server: server.clone(), fail: false }
    }

    /// A factory whose object is not registered.
    pub fn failing(server: &MockServer) -> Self {
        MockFactory { server: server.clone(), fail: true }
    }
}

impl RemoteFactory for MockFactory {
    type Object = MockRemote;

    fn create(&self, prog_id: &str) -> Result<MockRemote, RemoteError> {
        if self.fail {
            return Err(RemoteError::with_code(0x80040154u32 as i32, "class not registered"));
        }
        self.server.access(|s| {
            s.calls.push(format!("create:{}", prog_id));
            s.ref_count += 1;
        });
        Ok(MockRemote { server: self.server.clone(), live: true })
    }
}


/// One reference to the mock object.
pub struct MockRemote {
    server: MockServer,
    live: bool,
}

impl RemoteObject for MockRemote {
    fn duplicate(&self) -> Self {
        self.server.access(|s| s.ref_count += 1);
        MockRemote { server: self.server.clone(), live: true }
    }

    fn release(mut self) -> u32 {
        self.live = false;
        self.server.decrement()
    }

    fn get_property(&self, name: &str) -> Result<Variant, RemoteError> {
        self.server.record(format!("get:{}", name), name)?;
        Ok(self.server.access(|s| s.properties.get(name).cloned().unwrap_or_default()))
    }

    fn put_property(&self, name: &str, value: Variant) -> Result<(), RemoteError> {
        self.server.record(format!("put:{}", name), name)?;
        self.server.access(|s| s.properties.insert(name.to_string(), value));
        Ok(())
    }

    fn call_method(&self, name: &str, args: &[Variant]) -> Result<Variant, RemoteError> {
        self.server.record(format!("call:{}", name), name)?;
        let stream = StdStream::ALL.into_iter().find(|s| s.redirect_method() == name);
        match (name, stream, args) {
            ("AddEnvironemntVariable", _, [Variant::Str(k), Variant::Str(v)]) => {
                self.server.access(|s| s.env.push((k.clone(), v.clone())));
                Ok(Variant::Empty)
            }
            (_, Some(stream), [Variant::Bool(true)]) => {
                Ok(Variant::Str(self.server.pipe_name(stream)))
            }
            _ => Err(RemoteError::with_code(0x80020003u32 as i32, "member not found")),
        }
    }
}

impl Drop for MockRemote {
    fn drop(&mut self) {
        if self.live {
            self.live = false;
            self.server.decrement();
        }
    }
}


#[derive(Default)]
struct DialerState {
    served: HashMap<String, Vec<u8>>,
    written: HashMap<String, Arc<Mutex<Vec<u8>>>>,
    dials: Vec<String>,
}

/// Serves in-memory pipe endpoints by path.
#[derive(Clone, Default)]
pub struct MockDialer {
    state: Arc<Mutex<DialerState>>,
}

impl MockDialer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an endpoint whose readers receive `content`.
    pub fn serve(&self, path: &str, content: &[u8]) {
        let mut state = self.state.lock().expect("dialer state poisoned");
        state.served.insert(path.to_string(), content.to_vec());
        state.written.insert(path.to_string(), Arc::new(Mutex::new(Vec::new())));
    }

    /// Everything the clients wrote to the endpoint.
    pub fn written(&self, path: &str) -> Vec<u8> {
        let state = self.state.lock().expect("dialer state poisoned");
        state
            .written
            .get(path)
            .map(|w| w.lock().expect("pipe buffer poisoned").clone())
            .unwrap_or_default()
    }

    pub fn dials(&self) -> Vec<String> {
        self.state.lock().expect("dialer state poisoned").dials.clone()
    }
}

impl PipeDialer for MockDialer {
    type Stream = MockPipe;

    fn dial(&self, path: &str) -> Result<MockPipe, std::io::Error> {
        let mut state = self.state.lock().expect("dialer state poisoned");
        state.dials.push(path.to_string());
        let content = state.served.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no pipe at {}", path))
        })?;
        let sink = state.written.get(path).cloned().unwrap_or_default();
        Ok(MockPipe { input: Cursor::new(content), output: sink })
    }
}

/// Client end of an in-memory pipe.
pub struct MockPipe {
    input: Cursor<Vec<u8>>,
    output: Arc<Mutex<Vec<u8>>>,
}

impl Read for MockPipe {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MockPipe {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut out = self
            .output
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "lock poisoned"))?;
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
