/// Renders the container build file for a bundled function.
///
/// The image copies the bundle and the launcher into `/opt/` and runs the
/// launcher with the same runtime the bundle was built for.
pub struct DockerfileGenerator<'a> {
    version: &'a str,
    base_image_suffix: &'a str,
    bundle_file: &'a str,
    launcher_file: &'a str,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(version: &'a str, bundle_file: &'a str, launcher_file: &'a str) -> Self {
        Self {
            version,
            base_image_suffix: "-buster-slim",
            bundle_file,
            launcher_file,
        }
    }

    pub fn with_base_image_suffix(mut self, suffix: &'a str) -> Self {
        self.base_image_suffix = suffix;
        self
    }

    pub fn render(&self) -> String {
        format!(
            r#"FROM node:{version}{suffix}
WORKDIR /opt/
COPY {bundle} {launcher} /opt/
ENTRYPOINT ["node", "./{launcher}"]
"#,
            version = self.version,
            suffix = self.base_image_suffix,
            bundle = self.bundle_file,
            launcher = self.launcher_file,
        )
    }
}
