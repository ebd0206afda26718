//! Manifest rendering
//!
//! Turns `templates/<id>.yaml.j2` into `deps/<id>.yaml` using the values
//! from `config.yaml`. The same path renders both Kubernetes manifests and
//! the test-case list.

pub mod template;
pub mod values;

use std::path::PathBuf;

use crate::common::paths::HomeDir;
use crate::common::{Error, Result};

pub use values::Values;

/// Renders templates of one home directory with one set of values
#[derive(Debug, Clone)]
pub struct Renderer {
    home: HomeDir,
    values: Values,
}

impl Renderer {
    pub fn new(home: HomeDir, values: Values) -> Self {
        Self { home, values }
    }

    /// Load `config.yaml` from the home directory and build a renderer
    pub fn load(home: HomeDir) -> Result<Self> {
        let values = Values::load(&home.values_file())?;
        Ok(Self::new(home, values))
    }

    pub fn home(&self) -> &HomeDir {
        &self.home
    }

    /// Render the template for `identifier` to text
    pub fn render_to_string(&self, identifier: &str) -> Result<String> {
        let path = self.home.template_file(identifier);
        let source = std::fs::read_to_string(&path).map_err(|e| Error::file_read(&path, &e))?;
        template::render(identifier, &source, self.values.as_value())
    }

    /// Render the template for `identifier` into `deps/`, overwriting any
    /// previous rendering, and return the written path
    pub fn render(&self, identifier: &str) -> Result<PathBuf> {
        let content = self.render_to_string(identifier)?;

        let deps = self.home.deps_dir();
        std::fs::create_dir_all(&deps)?;

        let output = self.home.rendered_file(identifier);
        std::fs::write(&output, content)?;

        tracing::debug!(identifier, path = %output.display(), "Rendered template");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn home_with(template: &str, values: &str) -> (tempfile::TempDir, HomeDir) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("templates/service.yaml.j2"), template).unwrap();
        fs::write(dir.path().join("config.yaml"), values).unwrap();
        let home = HomeDir::new(dir.path());
        (dir, home)
    }

    #[test]
    fn test_render_writes_deps_file() {
        let (_dir, home) = home_with("name: {{ app.name }}\n", "app:\n  name: echo\n");
        let renderer = Renderer::load(home.clone()).unwrap();

        let path = renderer.render("service").unwrap();
        assert_eq!(path, home.rendered_file("service"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name: echo\n");
    }

    #[test]
    fn test_render_twice_is_byte_identical() {
        let (_dir, home) = home_with("port: {{ port }}\nhosts: {{ hosts }}\n", "port: 80\nhosts: [a, b]\n");
        let renderer = Renderer::load(home).unwrap();

        let first = fs::read(renderer.render("service").unwrap()).unwrap();
        let second = fs::read(renderer.render("service").unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_overwrites_previous_output() {
        let (_dir, home) = home_with("kind: Service\n", "{}\n");
        fs::create_dir_all(home.deps_dir()).unwrap();
        fs::write(home.rendered_file("service"), "stale content that is much longer\n").unwrap();

        let renderer = Renderer::load(home).unwrap();
        let path = renderer.render("service").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "kind: Service\n");
    }

    #[test]
    fn test_render_missing_template() {
        let (_dir, home) = home_with("", "{}\n");
        let renderer = Renderer::load(home).unwrap();
        assert!(matches!(
            renderer.render("deployment"),
            Err(Error::FileRead { .. })
        ));
    }
}
