use std::{env, ffi::OsString, path::PathBuf, time::Duration};

use crate::{error::ShimError, ShimResult};

pub const USER_VAR: &str = "INTEROP_SHIM_USER";
pub const PASSWORD_VAR: &str = "INTEROP_SHIM_PASSWORD";
pub const TIMEOUT_VAR: &str = "INTEROP_SHIM_TIMEOUT_MS";
pub const SPOOL_ROOT_VAR: &str = "INTEROP_SHIM_SPOOL_ROOT";

fn utf8_value(name: &str, value: OsString) -> ShimResult<String> {
    value
        .into_string()
        .map_err(|value| ShimError::Argument(format!("{}={:?} is not UTF-8", name, value)))
}

/// Settings shared by every shim run
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShimOptions {
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) timeout_ms: u64,
    pub(crate) spool_root: PathBuf,
    pub(crate) poll_interval_ms: u64,
}

impl Default for ShimOptions {
    fn default() -> Self {
        ShimOptions {
            user: "guest".to_owned(),
            password: "guest".to_owned(),
            timeout_ms: 10_000,
            spool_root: env::temp_dir().join("interop-shims"),
            poll_interval_ms: 20,
        }
    }
}

impl ShimOptions {
    /// Defaults overridden by the `INTEROP_SHIM_*` environment variables
    pub fn from_env() -> ShimResult<ShimOptions> {
        ShimOptions::default().with_vars(env::vars_os())
    }

    /// Only the shim's own variables need to be UTF-8.
    pub(crate) fn with_vars(
        mut self,
        vars: impl IntoIterator<Item = (OsString, OsString)>,
    ) -> ShimResult<ShimOptions> {
        for (name, value) in vars {
            match name.to_str() {
                Some(USER_VAR) => self.user = utf8_value(USER_VAR, value)?,
                Some(PASSWORD_VAR) => self.password = utf8_value(PASSWORD_VAR, value)?,
                Some(TIMEOUT_VAR) => {
                    let value = utf8_value(TIMEOUT_VAR, value)?;
                    self.timeout_ms = value.trim().parse().map_err(|err| {
                        ShimError::Argument(format!("{}=\"{}\": {}", TIMEOUT_VAR, value, err))
                    })?
                }
                Some(SPOOL_ROOT_VAR) if value.is_empty() => {
                    return Err(ShimError::Argument(format!("{} is empty", SPOOL_ROOT_VAR)))
                }
                Some(SPOOL_ROOT_VAR) => self.spool_root = PathBuf::from(value),
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn user(mut self, user: &str) -> ShimOptions {
        self.user = user.to_owned();
        self
    }

    pub fn password(mut self, password: &str) -> ShimOptions {
        self.password = password.to_owned();
        self
    }

    /// How long a receiver waits for each expected message
    pub fn timeout(mut self, timeout: Duration) -> ShimOptions {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn spool_root(mut self, root: impl Into<PathBuf>) -> ShimOptions {
        self.spool_root = root.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> ShimOptions {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn get_user(&self) -> &str {
        &self.user
    }

    pub fn get_password(&self) -> &str {
        &self.password
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn get_spool_root(&self) -> &PathBuf {
        &self.spool_root
    }

    pub fn get_poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsString, time::Duration};

    use pretty_assertions::assert_eq;

    use super::{ShimOptions, SPOOL_ROOT_VAR, TIMEOUT_VAR, USER_VAR};

    fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(name, value)| (OsString::from(name), OsString::from(value)))
            .collect()
    }

    #[test]
    fn defaults() {
        let options = ShimOptions::default();
        assert_eq!("guest", options.get_user());
        assert_eq!(Duration::from_secs(10), options.get_timeout());
        assert!(options.get_spool_root().ends_with("interop-shims"));
    }

    #[test]
    fn environment_overrides() {
        let options = ShimOptions::default()
            .with_vars(vars(&[
                (USER_VAR, "admin"),
                (TIMEOUT_VAR, "250"),
                (SPOOL_ROOT_VAR, "/var/spool/shims"),
                ("PATH", "/usr/bin"),
            ]))
            .unwrap();
        assert_eq!("admin", options.get_user());
        assert_eq!("guest", options.get_password());
        assert_eq!(Duration::from_millis(250), options.get_timeout());
        assert_eq!("/var/spool/shims", options.get_spool_root().to_str().unwrap());
    }

    #[test]
    fn invalid_environment_is_an_argument_error() {
        assert!(ShimOptions::default()
            .with_vars(vars(&[(TIMEOUT_VAR, "ten seconds")]))
            .is_err());
        assert!(ShimOptions::default()
            .with_vars(vars(&[(SPOOL_ROOT_VAR, "")]))
            .is_err());
    }

    #[cfg(unix)]
    #[test]
    fn only_shim_variables_must_be_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let not_utf8 = || OsString::from_vec(vec![0xff, 0xfe]);
        let mut env = vars(&[(USER_VAR, "admin")]);
        env.push((OsString::from("UNRELATED"), not_utf8()));
        env.push((not_utf8(), OsString::from("value")));
        let options = ShimOptions::default().with_vars(env).unwrap();
        assert_eq!("admin", options.get_user());

        let env = vec![(OsString::from(TIMEOUT_VAR), not_utf8())];
        assert!(matches!(
            ShimOptions::default().with_vars(env),
            Err(crate::error::ShimError::Argument(_))
        ));
    }

    #[test]
    fn builder_setters() {
        let options = ShimOptions::default()
            .user("u")
            .password("p")
            .timeout(Duration::from_millis(5))
            .poll_interval(Duration::from_millis(0));
        assert_eq!("p", options.get_password());
        assert_eq!(Duration::from_millis(5), options.get_timeout());
        assert_eq!(Duration::from_millis(1), options.get_poll_interval());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_partial_options() {
        let options: ShimOptions =
            serde_json::from_str(r#"{"user": "svc", "timeout_ms": 1500}"#).unwrap();
        assert_eq!("svc", options.get_user());
        assert_eq!(Duration::from_millis(1500), options.get_timeout());
        assert_eq!(ShimOptions::default().get_spool_root(), options.get_spool_root());
    }
}
