use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use uuid::Uuid;
use warp::reply::Reply;

/// Per-client flags kept server-side, keyed by the opaque `sid` cookie.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub admin_authenticated: bool,
    pub test_completed: bool,
    flash: Option<String>,
}

/// In-process session store. Sessions are created lazily on first contact
/// and live for the process lifetime; all the study flow needs are two
/// booleans and a one-shot notice slot.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session id for this request: the presented cookie when it names a
    /// known session, otherwise a freshly created one.
    pub fn resolve(&self, cookie: Option<String>) -> String {
        if let Some(sid) = cookie {
            if self.inner.read().unwrap().contains_key(&sid) {
                return sid;
            }
        }

        let sid = Uuid::new_v4().to_string();
        self.inner
            .write()
            .unwrap()
            .insert(sid.clone(), SessionData::default());
        sid
    }

    pub fn get(&self, sid: &str) -> SessionData {
        self.inner
            .read()
            .unwrap()
            .get(sid)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_admin(&self, sid: &str) -> bool {
        self.get(sid).admin_authenticated
    }

    pub fn set_admin(&self, sid: &str, value: bool) {
        let mut guard = self.inner.write().unwrap();
        guard.entry(sid.to_string()).or_default().admin_authenticated = value;
    }

    pub fn mark_test_completed(&self, sid: &str) {
        let mut guard = self.inner.write().unwrap();
        guard.entry(sid.to_string()).or_default().test_completed = true;
    }

    pub fn set_flash(&self, sid: &str, message: &str) {
        let mut guard = self.inner.write().unwrap();
        guard.entry(sid.to_string()).or_default().flash = Some(message.to_string());
    }

    /// Removes and returns the pending notice, if any.
    pub fn take_flash(&self, sid: &str) -> Option<String> {
        let mut guard = self.inner.write().unwrap();
        guard.get_mut(sid).and_then(|data| data.flash.take())
    }
}

/// Attaches the session cookie so the browser presents the same sid on the
/// next request.
pub fn with_session_cookie(reply: impl Reply, sid: &str) -> warp::reply::Response {
    warp::reply::with_header(
        reply,
        "set-cookie",
        format!("sid={sid}; Path=/; HttpOnly; SameSite=Lax"),
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_reuses_known_sessions() {
        let store = SessionStore::new();
        let sid = store.resolve(None);
        assert_eq!(store.resolve(Some(sid.clone())), sid);
    }

    #[test]
    fn resolve_discards_unknown_cookies() {
        let store = SessionStore::new();
        let sid = store.resolve(Some("forged".into()));
        assert_ne!(sid, "forged");
    }

    #[test]
    fn admin_flag_round_trips() {
        let store = SessionStore::new();
        let sid = store.resolve(None);

        assert!(!store.is_admin(&sid));
        store.set_admin(&sid, true);
        assert!(store.is_admin(&sid));
        store.set_admin(&sid, false);
        assert!(!store.is_admin(&sid));
    }

    #[test]
    fn flash_is_one_shot() {
        let store = SessionStore::new();
        let sid = store.resolve(None);

        store.set_flash(&sid, "wrong password");
        assert_eq!(store.take_flash(&sid).as_deref(), Some("wrong password"));
        assert_eq!(store.take_flash(&sid), None);
    }

    #[test]
    fn test_completed_stays_set() {
        let store = SessionStore::new();
        let sid = store.resolve(None);

        store.mark_test_completed(&sid);
        assert!(store.get(&sid).test_completed);
    }
}
