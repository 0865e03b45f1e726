/// User-Agent style marker attached to every status request.
pub const CLIENT_IDENTITY: &str = concat!("HPCCMon/", env!("CARGO_PKG_VERSION"));

pub fn client_identity() -> &'static str {
    CLIENT_IDENTITY
}
