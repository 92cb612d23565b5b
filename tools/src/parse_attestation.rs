// Licensed under the Apache-2.0 license

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use attestation::{Attestation, AttestationError, KEY_DESCRIPTION_OID};
use clap::Parser;
use log::{debug, info, LevelFilter};
use platform::default::CertificatePlatform;
use platform::FixedExtension;

/// Prints the key attestation record carried by a certificate.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// DER certificate, PEM certificate chain, or raw extension value.
    path: PathBuf,

    /// Treat the input as the DER extension value (an OCTET STRING) rather
    /// than a certificate.
    #[arg(long)]
    extension: bool,

    /// Log every authorization tag as it is parsed.
    #[arg(long)]
    verbose: bool,
}

/// Returns the DER certificates in `input`, leaf first.
fn certificates(input: &[u8]) -> anyhow::Result<Vec<Vec<u8>>> {
    if !input.starts_with(b"-----BEGIN") {
        return Ok(vec![input.to_vec()]);
    }

    let certs: Vec<Vec<u8>> = pem::parse_many(input)
        .context("failed to parse PEM input")?
        .into_iter()
        .filter(|pem| pem.tag() == "CERTIFICATE")
        .map(|pem| pem.into_contents())
        .collect();
    if certs.is_empty() {
        bail!("no CERTIFICATE blocks in PEM input");
    }
    Ok(certs)
}

fn parse(args: &Args, input: &[u8]) -> anyhow::Result<Attestation> {
    if args.extension {
        let mut platform = FixedExtension::new(KEY_DESCRIPTION_OID, input);
        return Ok(Attestation::from_platform(&mut platform)?);
    }

    // The attestation normally sits in the leaf, but accept it anywhere in
    // the chain.
    for (i, der) in certificates(input)?.iter().enumerate() {
        let mut platform = CertificatePlatform::from_der(der)
            .with_context(|| format!("certificate {i} is not valid X.509"))?;
        debug!(
            "Certificate {i} subject: {}",
            platform.certificate().tbs_certificate.subject
        );
        match Attestation::from_platform(&mut platform) {
            Err(AttestationError::MissingExtension(_)) => {
                debug!("Certificate {i} has no attestation extension");
            }
            result => return Ok(result?),
        }
    }
    bail!("no certificate carries extension {KEY_DESCRIPTION_OID}")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let input =
        fs::read(&args.path).with_context(|| format!("failed to read {}", args.path.display()))?;
    info!("Read {} bytes from {}", input.len(), args.path.display());

    let attestation = parse(&args, &input)?;
    println!("{attestation}");

    for (label, list) in [
        ("SW", attestation.software_enforced()),
        ("TEE", attestation.tee_enforced()),
    ] {
        match list.padding_modes_as_strings() {
            Ok(modes) if !modes.is_empty() => println!("{label} padding: {}", modes.join(", ")),
            Ok(_) => {}
            Err(e) => println!("{label} padding: {e}"),
        }
    }

    Ok(())
}
