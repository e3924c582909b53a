use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls_pemfile::{certs, pkcs8_private_keys};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Build a rustls server config from a PEM certificate chain and a PKCS8
/// private key on disk.
pub fn load_rustls_config(
    cert_path: &Path,
    key_path: &Path,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut cert_reader = BufReader::new(File::open(cert_path)?);
    let mut key_reader = BufReader::new(File::open(key_path)?);

    let cert_chain: Vec<CertificateDer<'static>> =
        certs(&mut cert_reader).collect::<Result<Vec<_>, _>>()?;

    let mut keys = pkcs8_private_keys(&mut key_reader).collect::<Result<Vec<_>, _>>()?;
    if keys.is_empty() {
        return Err(format!("no PKCS8 private key found in {}", key_path.display()).into());
    }

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, PrivateKeyDer::Pkcs8(keys.remove(0)))?;

    Ok(config)
}
