/// What the landing view needs to know about the login session.
pub trait AuthContext {
    fn authenticated(&self) -> bool;
    fn logout(&mut self);
}

/// Process-local session flag; login happens elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSession {
    authenticated: bool,
}

impl LocalSession {
    pub fn signed_in() -> Self {
        Self {
            authenticated: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            authenticated: false,
        }
    }
}

impl AuthContext for LocalSession {
    fn authenticated(&self) -> bool {
        self.authenticated
    }

    fn logout(&mut self) {
        if self.authenticated {
            tracing::info!("logged out");
        }
        self.authenticated = false;
    }
}
