// Licensed under the Apache-2.0 license

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use attestation::asn1::DerWriter;
use attestation::names::{
    KM_ALGORITHM_EC, KM_DIGEST_SHA_2_256, KM_EC_CURVE_P256, KM_PURPOSE_SIGN, KM_PURPOSE_VERIFY,
};
use attestation::KeymasterTag;
use clap::Parser;
use log::info;

const ATTESTATION_VERSION: u64 = 3;
const KEYMASTER_VERSION: u64 = 4;
const SECURITY_LEVEL_TEE: u64 = 1;
const OS_VERSION: u64 = 140000;
const OS_PATCH_LEVEL: u64 = 202409;
const CREATION_DATETIME: u64 = 1_727_740_800_000;

/// Emits a sample key attestation extension value.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Attestation challenge to embed.
    #[arg(long, default_value = "sample challenge")]
    challenge: String,

    /// Write the raw DER extension value here instead of printing hex.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn entry(w: &mut DerWriter, tag: KeymasterTag, f: impl FnOnce(&mut DerWriter)) {
    w.encode_explicit(tag.number(), f);
}

/// Builds the extension value for an EC P-256 signing key generated in a TEE.
fn sample_extension(challenge: &[u8]) -> Vec<u8> {
    let mut w = DerWriter::new();
    w.encode_octet_string_with(|w| {
        w.encode_sequence(|w| {
            w.encode_integer(ATTESTATION_VERSION);
            w.encode_enumerated(SECURITY_LEVEL_TEE);
            w.encode_integer(KEYMASTER_VERSION);
            w.encode_enumerated(SECURITY_LEVEL_TEE);
            w.encode_octet_string(challenge);
            w.encode_octet_string(&[]);

            // Software enforced
            w.encode_sequence(|w| {
                entry(w, KeymasterTag::CreationDateTime, |w| {
                    w.encode_integer(CREATION_DATETIME);
                });
                entry(w, KeymasterTag::AttestationApplicationId, |w| {
                    w.encode_octet_string_with(|w| {
                        w.encode_sequence(|w| {
                            w.encode_set(|w| {
                                w.encode_sequence(|w| {
                                    w.encode_octet_string(b"com.example.attest");
                                    w.encode_integer(1);
                                });
                            });
                            w.encode_set(|w| {
                                w.encode_octet_string(&[0x5A; 32]);
                            });
                        });
                    });
                });
            });

            // TEE enforced
            w.encode_sequence(|w| {
                entry(w, KeymasterTag::Purpose, |w| {
                    w.encode_set(|w| {
                        w.encode_integer(KM_PURPOSE_SIGN as u64);
                        w.encode_integer(KM_PURPOSE_VERIFY as u64);
                    });
                });
                entry(w, KeymasterTag::Algorithm, |w| {
                    w.encode_integer(KM_ALGORITHM_EC as u64);
                });
                entry(w, KeymasterTag::KeySize, |w| {
                    w.encode_integer(256);
                });
                entry(w, KeymasterTag::Digest, |w| {
                    w.encode_set(|w| {
                        w.encode_integer(KM_DIGEST_SHA_2_256 as u64);
                    });
                });
                entry(w, KeymasterTag::EcCurve, |w| {
                    w.encode_integer(KM_EC_CURVE_P256 as u64);
                });
                entry(w, KeymasterTag::NoAuthRequired, |w| {
                    w.encode_null();
                });
                entry(w, KeymasterTag::Origin, |w| {
                    w.encode_integer(0);
                });
                entry(w, KeymasterTag::RootOfTrust, |w| {
                    w.encode_sequence(|w| {
                        w.encode_octet_string(&[0xA5; 32]);
                        w.encode_bool(true);
                        w.encode_enumerated(0);
                        w.encode_octet_string(&[0x3C; 32]);
                    });
                });
                entry(w, KeymasterTag::OsVersion, |w| {
                    w.encode_integer(OS_VERSION);
                });
                entry(w, KeymasterTag::OsPatchLevel, |w| {
                    w.encode_integer(OS_PATCH_LEVEL);
                });
            });
        });
    });
    w.finish()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let extension = sample_extension(args.challenge.as_bytes());
    info!("Built {} byte attestation extension", extension.len());

    match &args.out {
        Some(path) => fs::write(path, &extension)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", hex::encode(&extension)),
    }
    Ok(())
}
