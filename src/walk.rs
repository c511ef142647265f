//! Subtree walk engine: turns a sequence of GETNEXT/GETBULK responses into a
//! terminating, ordered enumeration. Sits above [`crate::ops`].

use crate::ber::Element;
use crate::error::ClientResult;
use crate::oid::{Oid, OidOrdering};
use crate::ops;
use crate::session::AgentSession;

/// Walk cursor configuration, plus the `-C` sub-flags that drive it.
pub struct WalkOptions {
    /// Upper bound, inclusive of the OID itself but exclusive — the walk stops before
    /// emitting anything at or past `end`.
    pub end: Option<Oid>,
    /// Reject a response whose next OID is not strictly greater than the last one seen.
    pub check_increase: bool,
    /// Issue one GET on `start` before beginning the GETNEXT/GETBULK loop.
    pub include_start: bool,
    /// If the walk emits nothing at all, fall back to a single GET on `start`.
    pub fallback_on_empty: bool,
    /// Use GETBULK instead of GETNEXT, with `max_repetitions` per round.
    pub bulk: bool,
    pub max_repetitions: u32,
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions {
            end: None,
            check_increase: true,
            include_start: false,
            fallback_on_empty: true,
            bulk: false,
            max_repetitions: 10,
        }
    }
}

/// Run a walk over the subtree rooted at `start`, returning every varbind encountered
/// in order.
pub fn walk(session: &mut AgentSession, start: &Oid, opts: &WalkOptions) -> ClientResult<Vec<(Oid, Element)>> {
    let mut emitted = Vec::new();

    if opts.include_start {
        let resp = ops::get(session, std::slice::from_ref(start))?;
        emitted.extend(resp.varbinds);
    }

    let mut last = start.clone();
    'outer: loop {
        let resp = if opts.bulk {
            ops::getbulk_with_error_fallback(
                session,
                std::slice::from_ref(&last),
                0,
                opts.max_repetitions,
                Some(&last),
            )?
        } else {
            ops::getnext_with_error_fallback(session, std::slice::from_ref(&last), &last)?
        };

        if resp.varbinds.is_empty() {
            break;
        }

        for (name, value) in resp.varbinds {
            if value.as_exception().is_some() {
                break 'outer;
            }

            let cmp = last.compare(&name);
            if opts.check_increase && matches!(cmp, OidOrdering::Greater | OidOrdering::Ancestor) {
                return Err(crate::error::ClientError::WalkMonotonicityError {
                    previous: last.clone(),
                    next: name,
                });
            }
            if cmp == OidOrdering::Equal {
                break 'outer;
            }
            if start.compare(&name) != OidOrdering::Descendant {
                break 'outer;
            }
            if let Some(end) = &opts.end {
                if !matches!(end.compare(&name), OidOrdering::Greater) {
                    break 'outer;
                }
            }

            last = name.clone();
            emitted.push((name, value));
        }
    }

    if opts.fallback_on_empty && emitted.is_empty() {
        let resp = ops::get(session, std::slice::from_ref(start))?;
        emitted.extend(resp.varbinds);
    }

    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> Oid {
        Oid::new(s.split('.').map(|n| n.parse().unwrap()).collect()).unwrap()
    }

    #[test]
    fn default_options_check_increase_and_fallback() {
        let opts = WalkOptions::default();
        assert!(opts.check_increase);
        assert!(opts.fallback_on_empty);
        assert!(!opts.include_start);
    }

    #[test]
    fn subtree_boundary_detection_via_compare() {
        let start = oid("1.3.6.1.2.1.1");
        let inside = oid("1.3.6.1.2.1.1.1.0");
        let outside = oid("1.3.6.1.2.1.2.1.0");
        assert_eq!(start.compare(&inside), OidOrdering::Descendant);
        assert_ne!(start.compare(&outside), OidOrdering::Descendant);
    }

    #[test]
    fn end_bound_is_exclusive_inclusive_semantics() {
        // end set to X: walk stops once compare(end, v.name) != Greater, i.e. once
        // v.name reaches or passes end — so the last value strictly below end is kept.
        let end = oid("1.3.6.1.2.1.1.5.0");
        let before = oid("1.3.6.1.2.1.1.4.0");
        let at = oid("1.3.6.1.2.1.1.5.0");
        assert!(matches!(end.compare(&before), OidOrdering::Greater));
        assert!(!matches!(end.compare(&at), OidOrdering::Greater));
    }
}
