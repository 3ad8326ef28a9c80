//! Property-based tests for invariants that admit a generator: rendering
//! is a fixed point, and a denied env var falls back to its `meta.vars`
//! baseline, or empty without one.

use cli_replay_template::{assemble_vars, render};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

proptest! {
    /// P7: rendering a template's own output a second time against the
    /// same variables reproduces it exactly — there is no recursive
    /// re-interpretation of `{{ }}` syntax that the render might itself
    /// produce.
    #[test]
    fn render_output_is_a_fixed_point(
        name in "[a-zA-Z][a-zA-Z0-9_]{0,10}",
        value in "[a-zA-Z0-9 _./-]{0,20}",
        prefix in "[a-zA-Z0-9 ]{0,10}",
        suffix in "[a-zA-Z0-9 ]{0,10}",
    ) {
        let mut map = serde_json::Map::new();
        map.insert(name.clone(), Value::String(value));
        let vars = Value::Object(map);
        let template = format!("{}{{{{ .{} }}}}{}", prefix, name, suffix);

        let once = render(&template, &vars).expect("first render succeeds");
        let twice = render(&once, &vars).expect("second render succeeds");

        prop_assert_eq!(once, twice);
    }

    /// P8: a denied env var with a `meta.vars` baseline renders as the
    /// baseline value; without one it renders as the empty string. Either
    /// way the denied env value itself never appears in the output.
    #[test]
    fn denied_env_var_falls_back_to_baseline_or_empty(
        key in "[A-Z][A-Z0-9_]{0,10}",
        baseline in prop::option::of("[a-zA-Z0-9]{1,10}"),
        secret in "[a-zA-Z0-9]{1,10}",
    ) {
        let mut meta_vars = HashMap::new();
        if let Some(b) = &baseline {
            meta_vars.insert(key.clone(), b.clone());
        }
        let env = vec![(key.clone(), secret.clone())];

        let resolved = assemble_vars(&meta_vars, env, &["*".to_string()], &HashMap::new())
            .expect("assemble succeeds");

        let template = format!("[{{{{ .{} }}}}]", key);
        let output = render(&template, &resolved.context).expect("render succeeds");

        let expected = format!("[{}]", baseline.clone().unwrap_or_default());
        prop_assert_eq!(output, expected);
        prop_assert!(resolved.denied.contains(&key));
    }
}
