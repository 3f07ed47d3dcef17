use clinicore_auth::Credential;

/// Request-scoped credential context (decoded, signature-verified).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialContext {
    credential: Credential,
}

impl CredentialContext {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}
