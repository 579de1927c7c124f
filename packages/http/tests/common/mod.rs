use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Identity-encoded content ids (dag-pb) for the keys used in tests.
pub const FOO_ID: &str = "bafyaabbpmzxw6";
pub const MISSING_ID: &str = "bafyaacbpnvuxg43jnztq";

/// A blockstore-style key and its dag-pb content id.
pub const HELLO_KEY: &str = "/CIQCZ4SNXJP3BIYOE3UDWKWFXHRJ4GYWDZOB7J2CLZZQIM3CSOFZQJA";
pub const HELLO_ID: &str = "bafybeibm6jg3ux5qumhcn2b3flc3tyu6dmlb4xa7u5bf44yegnrjhc4yeq";

/// An in-memory object store speaking the put/get/has/delete protocol.
#[derive(Clone, Default)]
pub struct ObjectStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl ObjectStore {
    pub async fn mount(server: &MockServer) -> Self {
        let store = Self::default();
        Mock::given(any())
            .respond_with(store.clone())
            .mount(server)
            .await;
        store
    }

    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

impl Respond for ObjectStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request
            .url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();
        let (route, id) = match segments.as_slice() {
            [route, id] => (*route, id.to_string()),
            _ => return ResponseTemplate::new(400),
        };

        let mut objects = self.objects.lock().unwrap();
        match (request.method.as_str(), route) {
            ("PUT", "put") => {
                objects.insert(id, request.body.clone());
                ResponseTemplate::new(200)
            }
            ("GET", "get") => match objects.get(&id) {
                Some(body) => ResponseTemplate::new(200).set_body_bytes(body.clone()),
                None => ResponseTemplate::new(404).set_body_string("not found"),
            },
            ("HEAD", "has") => {
                if objects.contains_key(&id) {
                    ResponseTemplate::new(200)
                } else {
                    ResponseTemplate::new(404)
                }
            }
            ("DELETE", "delete") => match objects.remove(&id) {
                Some(_) => ResponseTemplate::new(200),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}
