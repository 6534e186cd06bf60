//! Vendor identifier providers.
//!
//! Where the identifier comes from is up to the embedder; the keychain only
//! needs something to ask when no identifier has been stored yet.

use uuid::Uuid;

/// Source of the current vendor identifier.
pub trait VendorIdProvider {
    /// `None` when the platform cannot supply an identifier right now.
    fn current_vendor_id(&self) -> Option<String>;
}

impl<F> VendorIdProvider for F
where
    F: Fn() -> Option<String>,
{
    fn current_vendor_id(&self) -> Option<String> {
        self()
    }
}

/// Always answers with the same value (or with nothing).
#[derive(Debug, Clone, Default)]
pub struct StaticVendorId(Option<String>);

impl StaticVendorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl VendorIdProvider for StaticVendorId {
    fn current_vendor_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Mints a fresh random identifier on every call, formatted like a platform
/// vendor id (uppercase, hyphenated UUID).
///
/// Only stable once written: pair it with `UserKeychain::ensure_vendor_id`,
/// which asks at most once per install.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedVendorId;

impl VendorIdProvider for GeneratedVendorId {
    fn current_vendor_id(&self) -> Option<String> {
        let mut buf = Uuid::encode_buffer();
        Some(Uuid::new_v4().hyphenated().encode_upper(&mut buf).to_string())
    }
}
