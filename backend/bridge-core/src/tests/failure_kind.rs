use crate::dispatcher::{FailureKind, failure_kind};
use crate::error::codec::CodecError;
use crate::error::dispatch::DispatchError;
use crate::error::gateway::GatewayError;

use common::ErrorLocation;

use std::panic::Location;

fn here() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

/// **VALUE**: Verifies each dispatch error lands in the right failure kind.
///
/// **WHY THIS MATTERS**: The UI shows "wrong password" for `Call`, "try again" for
/// `Gateway` and a bug report prompt for `Protocol`. A wrong mapping misleads the user.
///
/// **BUG THIS CATCHES**: Would catch decode errors being folded into `InvalidRequest`
/// alongside encode errors.
#[test]
fn given_each_dispatch_error_when_mapped_then_kind_matches_taxonomy() {
    // GIVEN: One error of each family
    let decode = DispatchError::from(CodecError::Decode {
        message: String::from("not json"),
        location: here(),
    });
    let nul = DispatchError::from(CodecError::InteriorNul {
        field: "param1",
        location: here(),
    });
    let too_many = DispatchError::from(CodecError::TooManyParams {
        method: String::from("signin"),
        count: 3,
        location: here(),
    });
    let null_reply = DispatchError::from(GatewayError::NullReply { location: here() });
    let protocol = DispatchError::Protocol {
        method: String::from("decrypt"),
        message: String::from("expected a string"),
        location: here(),
    };

    // WHEN/THEN: Each maps to its kind
    assert_eq!(failure_kind(&decode), FailureKind::Protocol);
    assert_eq!(failure_kind(&nul), FailureKind::InvalidRequest);
    assert_eq!(failure_kind(&too_many), FailureKind::InvalidRequest);
    assert_eq!(failure_kind(&null_reply), FailureKind::Gateway);
    assert_eq!(failure_kind(&protocol), FailureKind::Protocol);
}
