//! End-to-end merge behavior through the public library API.

use apidecl::model::*;
use apidecl::store;
use tempfile::TempDir;

fn v(text: &str) -> Version {
    Version::parse(text).unwrap()
}

fn release(text: &str) -> semver::Version {
    semver::Version::parse(text).unwrap()
}

fn single(function: ApiFunction) -> ApiCollection {
    let mut c = ApiCollection::new();
    c.add_function(function);
    c
}

fn named<'a>(c: &'a ApiCollection, name: &str) -> Vec<&'a ApiFunction> {
    c.functions.iter().filter(|f| f.name == name).collect()
}

#[test]
fn structurally_different_functions_stay_apart() {
    let left = single(ApiFunction::new("FooBar", None, v("1.0.0")));
    let right = single(
        ApiFunction::new("FooBar", None, v("2.0.0"))
            .with_parameters(vec![VariableSignature::new("foo", "string").nilable(true)]),
    );

    let combined = left.combine(&right);
    let foobars = named(&combined, "FooBar");
    assert_eq!(foobars.len(), 2);
    assert_eq!(foobars[0].version, v("1.0.0"));
    assert_eq!(foobars[1].parameters.len(), 1);
}

#[test]
fn identical_functions_share_a_range() {
    let left = single(ApiFunction::new("FooBar", None, v("1.0.0")));
    let right = single(ApiFunction::new("FooBar", None, v("2.0.0")));

    let combined = left.combine(&right);
    let foobars = named(&combined, "FooBar");
    assert_eq!(foobars.len(), 1);
    assert!(foobars[0].valid_at(&release("1.0.0")));
    assert!(foobars[0].valid_at(&release("2.0.0")));
    assert!(!foobars[0].valid_at(&release("1.5.0")));
}

fn release_snapshot(version: &str) -> ApiCollection {
    let mut c = ApiCollection::new();
    c.add_function(ApiFunction::new("Foo", None, v(version)));
    c.add_function(ApiFunction::new("Bar", None, v(&format!(">{version}"))));
    c.add_function(ApiFunction::new("Baz", None, v(&format!("<{version}"))));
    c
}

fn merged_releases() -> ApiCollection {
    let mut builder = ApiBuilder::new();
    for version in ["1.0.0", "2.0.0", "3.0.0"] {
        builder.add(release_snapshot(version));
    }
    builder.merge().unwrap()
}

#[test]
fn builder_merges_points_and_nested_ranges() {
    let filtered = merged_releases().filter_for_version(&release("2.0.0"));

    let versions: Vec<(&str, String)> = filtered
        .functions
        .iter()
        .map(|f| (f.name.as_str(), f.version.to_string()))
        .collect();
    assert_eq!(
        versions,
        [
            ("Foo", "1.0.0 || 2.0.0 || 3.0.0".to_string()),
            ("Bar", ">1.0.0".to_string()),
            ("Baz", "<3.0.0".to_string()),
        ]
    );
}

#[test]
fn filtering_outside_every_range_drops_the_name() {
    let merged = merged_releases();

    let later = merged.filter_for_version(&release("4.0.0"));
    assert!(named(&later, "Foo").is_empty());
    assert!(named(&later, "Baz").is_empty());
    assert_eq!(named(&later, "Bar").len(), 1);

    let earlier = merged.filter_for_version(&release("0.1.0"));
    assert!(named(&earlier, "Bar").is_empty());
}

#[test]
fn combining_with_empty_is_identity() {
    let merged = merged_releases();
    assert_eq!(merged.combine(&ApiCollection::new()), merged);
    assert_eq!(ApiCollection::new().combine(&merged), merged);
}

#[test]
fn json_round_trip_is_exact() {
    let mut merged = merged_releases();
    merged.add_table(
        ApiTable::new("ChannelType", Some("C_Chat"), TableKind::Enum, v("1.0.0 || >=2.5.0"))
            .with_values(vec![
                VariableSignature::new("None", "ChannelType").with_value(Literal::Number(0.0))
            ]),
    );
    merged.add_event(
        ApiEvent::new("PlayerLogin", "PLAYER_LOGIN", None, Version::Range(Range::any()))
            .with_description(Some("Fired on login.".into())),
    );

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("merged.json");
    store::save(&path, &merged).unwrap();
    let loaded = store::load(&path).unwrap();

    assert_eq!(loaded, merged);
    assert!(loaded.functions[0].version.to_string().contains("||"));
    assert_eq!(loaded.events[0].version.to_string(), "");
}

#[test]
fn invalid_version_text_fails_the_load() {
    let json = r#"{ "functions": [ { "name": "Foo", "version": "not a version" } ] }"#;
    assert!(ApiCollection::from_json(json).is_err());
}

#[test]
fn later_shape_after_divergence_is_appended() {
    let with_arg = |version: &str| {
        ApiFunction::new("Foo", None, v(version))
            .with_parameters(vec![VariableSignature::new("x", "number")])
    };
    let mut builder = ApiBuilder::new();
    builder
        .add(single(ApiFunction::new("Foo", None, v("1.0.0"))))
        .add(single(with_arg("2.0.0")))
        .add(single(with_arg("3.0.0")));

    // only the first same-named row is compared
    assert_eq!(named(&builder.merge().unwrap(), "Foo").len(), 3);
}
