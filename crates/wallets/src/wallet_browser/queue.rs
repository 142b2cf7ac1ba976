use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

/// FIFO of requests for the page, each with a responder that outlives its request.
///
/// A request leaves the queue when the page picks it up; its responder stays until the final answer
/// arrives. Only requests still in the queue can expire.
#[derive(Debug)]
pub(crate) struct RequestQueue<Req, Resp> {
    requests: VecDeque<(Uuid, Req)>,
    responders: HashMap<Uuid, Resp>,
}

impl<Req, Resp> Default for RequestQueue<Req, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> RequestQueue<Req, Resp> {
    pub fn new() -> Self {
        Self { requests: VecDeque::new(), responders: HashMap::new() }
    }

    pub fn add_request(&mut self, id: Uuid, request: Req, responder: Resp) {
        self.requests.push_back((id, request));
        self.responders.insert(id, responder);
    }

    /// Whether `id` is still awaiting an answer.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.responders.contains_key(id)
    }

    pub fn has_request(&self, id: &Uuid) -> bool {
        self.requests.iter().any(|(request_id, _)| request_id == id)
    }

    /// Hands out the oldest request. Its responder stays in flight until [`Self::remove`].
    pub fn take_request(&mut self) -> Option<Req> {
        self.requests.pop_front().map(|(_, request)| request)
    }

    /// Removes the request but keeps its responder.
    pub fn remove_request(&mut self, id: &Uuid) {
        self.requests.retain(|(request_id, _)| request_id != id);
    }

    pub fn responder(&self, id: &Uuid) -> Option<&Resp> {
        self.responders.get(id)
    }

    /// Removes the request and returns its responder.
    pub fn remove(&mut self, id: &Uuid) -> Option<Resp> {
        self.remove_request(id);
        self.responders.remove(id)
    }
}
