//! Name to id resolution
//!
//! Node properties name scripts by `(script_package, script_name)` and
//! probes by `genalyzer` name. The service only understands ids, so before
//! a test group is submitted every name is looked up in the lists fetched
//! from the service and replaced by the matching id. The first match in
//! fetch order wins; duplicates are not reported.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::common::{is_blank, Error, Result};
use crate::properties::{InputValue, TestEntry, TestGroupConfig};
use crate::service::{Probe, TestScript};

/// Id of the first probe called `name`
pub fn resolve_probe_id(name: &str, probes: &[Probe]) -> Result<Value> {
    if name.is_empty() {
        return Err(Error::MissingField("probe name"));
    }
    probes
        .iter()
        .find(|probe| probe.name == name)
        .map(|probe| probe.id.clone())
        .ok_or_else(|| Error::UnknownProbe {
            name: name.to_string(),
        })
}

/// Id of the first script matching both `package` and `name`
pub fn resolve_script_id(scripts: &[TestScript], package: &str, name: &str) -> Result<Value> {
    if package.is_empty() || name.is_empty() {
        return Err(Error::MissingField("script name"));
    }
    scripts
        .iter()
        .find(|script| script.package == package && script.name == name)
        .map(|script| script.id.clone())
        .ok_or_else(|| Error::unknown_script(package, name))
}

/// Replace `genalyzer` names in mapping-valued inputs by `genalyzer_id`
///
/// Only the first level is inspected; scalars and mappings without a
/// `genalyzer` key are left as they are.
pub fn rewrite_input_values(
    values: &mut BTreeMap<String, InputValue>,
    probes: &[Probe],
) -> Result<()> {
    for value in values.values_mut() {
        let InputValue::Probe(reference) = value else {
            continue;
        };
        let Some(genalyzer) = reference.genalyzer.take() else {
            continue;
        };
        let id = match &genalyzer {
            blank if is_blank(blank) => Err(Error::MissingField("probe name")),
            Value::String(name) => resolve_probe_id(name, probes),
            other => Err(Error::UnknownProbe {
                name: other.to_string(),
            }),
        };
        match id {
            Ok(id) => reference.genalyzer_id = Some(id),
            Err(e) => {
                reference.genalyzer = Some(genalyzer);
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Whether a test id asks the service to allocate a new one
fn requests_new_id(id: Option<&Value>) -> bool {
    match id {
        None => true,
        Some(Value::String(s)) => s == "None",
        Some(_) => false,
    }
}

/// Resolve one test entry in place
pub fn resolve_test_entry(
    entry: &mut TestEntry,
    probes: &[Probe],
    scripts: &[TestScript],
) -> Result<()> {
    if requests_new_id(entry.id.as_ref()) {
        entry.id = None;
    }

    if entry.script_name.is_some() || entry.script_package.is_some() {
        let script_id = resolve_script_id(
            scripts,
            entry.script_package.as_deref().unwrap_or(""),
            entry.script_name.as_deref().unwrap_or(""),
        )?;
        entry.script_id = Some(script_id);
        entry.script_package = None;
        entry.script_name = None;
    }

    if let Some(values) = entry.inputvalues.as_mut() {
        rewrite_input_values(values, probes)?;
    }

    Ok(())
}

/// Resolve every test of a test group in order
///
/// Stops at the first entry that fails to resolve; entries before it have
/// already been rewritten.
pub fn resolve_test_group(
    config: &mut TestGroupConfig,
    probes: &[Probe],
    scripts: &[TestScript],
) -> Result<()> {
    for entry in config.tests.iter_mut() {
        resolve_test_entry(entry, probes, scripts)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::ProbeReference;
    use serde_json::json;

    fn probes() -> Vec<Probe> {
        vec![
            Probe {
                name: "probeA".to_string(),
                id: json!(7),
            },
            Probe {
                name: "probeB".to_string(),
                id: json!(8),
            },
            Probe {
                name: "probeA".to_string(),
                id: json!(99),
            },
        ]
    }

    fn scripts() -> Vec<TestScript> {
        vec![
            TestScript {
                package: "netrounds.tcp".to_string(),
                name: "tcp_throughput".to_string(),
                id: json!(301),
            },
            TestScript {
                package: "netrounds.udp".to_string(),
                name: "tcp_throughput".to_string(),
                id: json!(302),
            },
        ]
    }

    fn entry(value: serde_json::Value) -> TestEntry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_probe_found() {
        assert_eq!(resolve_probe_id("probeB", &probes()).unwrap(), json!(8));
    }

    #[test]
    fn test_probe_first_match_wins() {
        assert_eq!(resolve_probe_id("probeA", &probes()).unwrap(), json!(7));
    }

    #[test]
    fn test_probe_not_found() {
        let err = resolve_probe_id("probeZ", &probes()).unwrap_err();
        assert!(matches!(err, Error::UnknownProbe { .. }));
        assert_eq!(err.to_string(), "Unknow probe");
    }

    #[test]
    fn test_probe_empty_name_fails_before_search() {
        let err = resolve_probe_id("", &[]).unwrap_err();
        assert_eq!(err.to_string(), "probe name must be specified");
    }

    #[test]
    fn test_script_found() {
        assert_eq!(
            resolve_script_id(&scripts(), "netrounds.udp", "tcp_throughput").unwrap(),
            json!(302)
        );
    }

    #[test]
    fn test_script_must_match_both_fields() {
        let err = resolve_script_id(&scripts(), "netrounds.tcp", "udp_loss").unwrap_err();
        assert_eq!(err.to_string(), "Unknow test script");
        let err = resolve_script_id(&scripts(), "netrounds.http", "tcp_throughput").unwrap_err();
        assert!(matches!(err, Error::UnknownScript { .. }));
    }

    #[test]
    fn test_script_missing_fields() {
        for (package, name) in [("", "tcp_throughput"), ("netrounds.tcp", "")] {
            let err = resolve_script_id(&scripts(), package, name).unwrap_err();
            assert_eq!(err.to_string(), "script name must be specified");
        }
    }

    #[test]
    fn test_rewrite_input_values() {
        let mut values: BTreeMap<String, InputValue> = serde_json::from_value(json!({
            "x": {"genalyzer": "probeA", "other": 1},
            "y": {"interface": "eth0"},
            "z": 5
        }))
        .unwrap();

        rewrite_input_values(&mut values, &probes()).unwrap();

        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!({
                "x": {"genalyzer_id": 7, "other": 1},
                "y": {"interface": "eth0"},
                "z": 5
            })
        );
    }

    #[test]
    fn test_rewrite_does_not_recurse() {
        let mut values: BTreeMap<String, InputValue> = serde_json::from_value(json!({
            "outer": {"inner": {"genalyzer": "probeZ"}}
        }))
        .unwrap();
        rewrite_input_values(&mut values, &probes()).unwrap();
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!({"outer": {"inner": {"genalyzer": "probeZ"}}})
        );
    }

    #[test]
    fn test_rewrite_unknown_probe_keeps_name() {
        let mut values = BTreeMap::new();
        values.insert(
            "client".to_string(),
            InputValue::Probe(ProbeReference {
                genalyzer: Some(json!("probeZ")),
                ..ProbeReference::default()
            }),
        );
        let err = rewrite_input_values(&mut values, &probes()).unwrap_err();
        assert!(matches!(err, Error::UnknownProbe { .. }));
        match &values["client"] {
            InputValue::Probe(reference) => assert_eq!(reference.genalyzer, Some(json!("probeZ"))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rewrite_null_probe_name_is_missing() {
        let mut values: BTreeMap<String, InputValue> =
            serde_json::from_value(json!({"client": {"genalyzer": null}})).unwrap();
        let err = rewrite_input_values(&mut values, &probes()).unwrap_err();
        assert!(matches!(err, Error::MissingField("probe name")));
    }

    #[test]
    fn test_rewrite_blank_probe_names_are_missing() {
        for blank in [json!(0), json!(false), json!([]), json!("")] {
            let mut values: BTreeMap<String, InputValue> =
                serde_json::from_value(json!({"client": {"genalyzer": blank.clone()}})).unwrap();
            let err = rewrite_input_values(&mut values, &probes()).unwrap_err();
            assert!(
                matches!(err, Error::MissingField("probe name")),
                "{} gave {:?}",
                blank,
                err
            );
        }

        let mut values: BTreeMap<String, InputValue> =
            serde_json::from_value(json!({"client": {"genalyzer": 12}})).unwrap();
        let err = rewrite_input_values(&mut values, &probes()).unwrap_err();
        assert!(matches!(err, Error::UnknownProbe { .. }));
    }

    #[test]
    fn test_unnamed_listing_entries_never_match() {
        let probes: Vec<Probe> = serde_json::from_value(json!([
            {"name": null, "id": 1},
            {"name": "probeA", "id": 7}
        ]))
        .unwrap();
        assert_eq!(resolve_probe_id("probeA", &probes).unwrap(), json!(7));

        let scripts: Vec<TestScript> = serde_json::from_value(json!([
            {"package": null, "name": "tcp_throughput", "id": 300},
            {"package": "netrounds.tcp", "name": null, "id": 299},
            {"package": "netrounds.tcp", "name": "tcp_throughput", "id": 301}
        ]))
        .unwrap();
        assert_eq!(
            resolve_script_id(&scripts, "netrounds.tcp", "tcp_throughput").unwrap(),
            json!(301)
        );
    }

    #[test]
    fn test_none_id_is_normalized() {
        let mut test = entry(json!({"id": "None"}));
        resolve_test_entry(&mut test, &probes(), &scripts()).unwrap();
        assert_eq!(test.id, None);

        let mut test = entry(json!({}));
        resolve_test_entry(&mut test, &probes(), &scripts()).unwrap();
        assert_eq!(serde_json::to_value(&test).unwrap(), json!({"id": null}));
    }

    #[test]
    fn test_other_ids_pass_through() {
        for id in [json!(0), json!(""), json!("tg-4"), json!(12)] {
            let mut test = entry(json!({"id": id.clone()}));
            resolve_test_entry(&mut test, &probes(), &scripts()).unwrap();
            assert_eq!(test.id, Some(id));
        }
    }

    #[test]
    fn test_script_names_replaced_by_id() {
        let mut test = entry(json!({
            "script_package": "netrounds.tcp",
            "script_name": "tcp_throughput",
            "duration": 60
        }));
        resolve_test_entry(&mut test, &probes(), &scripts()).unwrap();
        assert_eq!(
            serde_json::to_value(&test).unwrap(),
            json!({"id": null, "script_id": 301, "duration": 60})
        );
    }

    #[test]
    fn test_script_name_alone_is_missing_field() {
        let mut test = entry(json!({"script_name": "tcp_throughput"}));
        let err = resolve_test_entry(&mut test, &probes(), &scripts()).unwrap_err();
        assert_eq!(err.to_string(), "script name must be specified");
    }

    #[test]
    fn test_resolve_group_in_order() {
        let mut config = TestGroupConfig {
            name: "g1".to_string(),
            description: String::new(),
            tests: vec![
                entry(json!({
                    "id": "None",
                    "script_package": "netrounds.tcp",
                    "script_name": "tcp_throughput",
                    "inputvalues": {"client": {"genalyzer": "probeB"}}
                })),
                entry(json!({"id": 5, "script_package": "netrounds.tcp", "script_name": "nope"})),
            ],
        };

        let err = resolve_test_group(&mut config, &probes(), &scripts()).unwrap_err();
        assert_eq!(err.to_string(), "Unknow test script");
        assert_eq!(
            serde_json::to_value(&config.tests[0]).unwrap(),
            json!({"id": null, "script_id": 301, "inputvalues": {"client": {"genalyzer_id": 8}}})
        );
    }

    #[test]
    fn test_resolve_empty_group_is_noop() {
        let mut config = TestGroupConfig {
            name: "g1".to_string(),
            description: String::new(),
            tests: Vec::new(),
        };
        resolve_test_group(&mut config, &[], &[]).unwrap();
        assert!(config.tests.is_empty());
    }
}
