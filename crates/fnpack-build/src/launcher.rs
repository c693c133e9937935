/// Renders the launcher script executed inside the container.
///
/// The launcher parses its last argument as JSON, runs the bundle's step and
/// prints one `{status, body}` envelope on stdout. Parse failures and
/// exceptions print a `status: 500` envelope and exit with code 1.
pub struct LauncherGenerator<'a> {
    step_id: &'a str,
    bundle_module: &'a str,
}

impl<'a> LauncherGenerator<'a> {
    /// `bundle_module` is the `require` specifier of the bundle, e.g. `./bundle`.
    pub fn new(step_id: &'a str, bundle_module: &'a str) -> Self {
        Self {
            step_id,
            bundle_module,
        }
    }

    pub fn render(&self) -> String {
        format!(
            r#"const fn = require({module});

const run = async function () {{
  const stepId = {step_id};
  let data = null;
  try {{
    data = JSON.parse(process.argv[process.argv.length - 1]);
  }} catch (e) {{
    console.log(JSON.stringify({{ status: 500, body: "Failed to parse args" }}));
    process.exit(1);
  }}
  try {{
    const result = await fn.default.runStep(stepId, data);
    if (result !== null && typeof result === "object" && typeof result.status !== "undefined") {{
      console.log(JSON.stringify(result));
    }} else {{
      console.log(JSON.stringify({{ status: 200, body: result }}));
    }}
  }} catch (e) {{
    const error = e.stack || e.message;
    console.log(JSON.stringify({{ status: 500, body: error, error }}));
    process.exit(1);
  }}
}};

run();
"#,
            module = js_string(self.bundle_module),
            step_id = js_string(self.step_id),
        )
    }
}

/// A JSON string literal is also a valid JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
