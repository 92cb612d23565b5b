/*++
Licensed under the Apache-2.0 license.

Abstract:
    Android key attestation extension parser.

    Decodes the KeyDescription carried by attestation certificates under
    OID 1.3.6.1.4.1.11129.2.1.17 into typed records: the attestation and
    keymaster versions and security levels, the challenge, and the software
    and TEE enforced authorization lists.
--*/

pub use application_id::{AttestationApplicationId, AttestationPackageInfo};
pub use attestation::{Attestation, SecurityLevel, KEY_DESCRIPTION_OID};
pub use authorization_list::AuthorizationList;
pub use error::{AttestationError, Result};
pub use root_of_trust::{RootOfTrust, VerifiedBootState};
pub use tag::KeymasterTag;
pub use timestamp::Timestamp;

pub mod application_id;
pub mod asn1;
pub mod attestation;
pub mod authorization_list;
pub mod error;
pub mod names;
pub mod root_of_trust;
pub mod tag;
mod timestamp;
