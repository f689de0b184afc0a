use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;

use crate::args;
use crate::error::TunnelError;
use crate::forward::{parse_forwards, Target};
use crate::system::{display_command, CommandRunner};
use crate::unit::{default_template, render_unit};

/// Where and how the tunnel service gets installed.
#[derive(Debug, Clone)]
pub(crate) struct TunnelSettings {
    pub service_name: String,
    pub unit_dir: PathBuf,
    pub ssh_key: PathBuf,
    pub template: String,
    /// Turn failed external steps into errors instead of warnings.
    pub strict: bool,
    pub require_root: bool,
}

impl TunnelSettings {
    pub fn from_args(args: &args::GlobalArgs) -> anyhow::Result<Self> {
        Ok(TunnelSettings {
            service_name: args.service_name.clone(),
            unit_dir: args.unit_dir.clone(),
            ssh_key: args.ssh_key.clone(),
            template: default_template()?,
            strict: args.strict,
            require_root: true,
        })
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(&self.service_name)
    }

    pub fn public_key_path(&self) -> PathBuf {
        let mut path = self.ssh_key.clone().into_os_string();
        path.push(".pub");
        PathBuf::from(path)
    }
}

#[cfg(target_os = "linux")]
fn ensure_root(settings: &TunnelSettings) -> anyhow::Result<()> {
    if settings.require_root && !nix::unistd::Uid::effective().is_root() {
        return Err(TunnelError::NotRoot.into());
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn ensure_root(settings: &TunnelSettings) -> anyhow::Result<()> {
    if settings.require_root {
        anyhow::bail!("This command is only supported on Linux");
    }

    Ok(())
}

/// Installs or removes the tunnel service. Operator output goes to `out`,
/// every external tool goes through `runner`.
pub(crate) struct Switch<'a, R, W> {
    settings: &'a TunnelSettings,
    runner: &'a mut R,
    out: &'a mut W,
}

impl<'a, R: CommandRunner, W: Write> Switch<'a, R, W> {
    pub fn new(settings: &'a TunnelSettings, runner: &'a mut R, out: &'a mut W) -> Self {
        Switch {
            settings,
            runner,
            out,
        }
    }

    pub fn on(&mut self, target: Option<&str>, tokens: &[String]) -> anyhow::Result<()> {
        let settings = self.settings;
        let service_name = settings.service_name.as_str();

        if self.is_enabled() {
            return Err(TunnelError::AlreadyEnabled {
                service: service_name.to_string(),
            }
            .into());
        }

        let target = Target::parse(target)?;
        let forwards = parse_forwards(tokens)?;
        let key_path = settings
            .ssh_key
            .to_str()
            .ok_or_else(|| TunnelError::InvalidKeyPath(settings.ssh_key.display().to_string()))?;

        ensure_root(settings)?;

        let unit = render_unit(&settings.template, &forwards, &target);

        writeln!(self.out)?;
        writeln!(self.out, "*** New systemd service: {service_name}")?;
        writeln!(self.out, "{unit}")?;

        if let Err(err) = self.write_unit(&unit) {
            self.tolerate(err)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "*** Checking root SSH keys")?;
        self.ensure_keypair(key_path)?;
        let public_key = self.read_public_key()?;

        writeln!(self.out)?;
        writeln!(self.out, "*** Install autossh")?;
        self.step("apt-get", &["install", "-y", "autossh"])?;

        writeln!(self.out)?;
        writeln!(self.out, "*** Enabling systemd service: {service_name}")?;
        self.step("systemctl", &["daemon-reload"])?;
        self.step("systemctl", &["enable", service_name])?;

        writeln!(self.out)?;
        writeln!(self.out, "*** OK - SSH TUNNEL SERVICE DONE SETUP ***")?;
        writeln!(self.out, "- Tunnel service needs final reboot to start.")?;
        writeln!(
            self.out,
            "- After reboot check logs: sudo journalctl -f -u {service_name}"
        )?;
        writeln!(
            self.out,
            "- Make sure the SSH pub key of this host is in 'authorized_keys' of {target} :"
        )?;
        match public_key {
            Some(key) => writeln!(self.out, "{}", key.trim_end())?,
            None => writeln!(
                self.out,
                "(no public key at {})",
                settings.public_key_path().display()
            )?,
        }
        writeln!(self.out)?;

        log::info!("Tunnel to {target} enabled with {} forward(s)", forwards.len());

        Ok(())
    }

    pub fn off(&mut self) -> anyhow::Result<()> {
        let settings = self.settings;
        let service_name = settings.service_name.as_str();

        writeln!(self.out, "*** Disabling systemd service: {service_name}")?;

        ensure_root(settings)?;

        self.step("systemctl", &["stop", service_name])?;
        self.step("systemctl", &["disable", service_name])?;

        let unit_path = settings.unit_path();
        match fs::remove_file(&unit_path) {
            Ok(()) => log::debug!("Removed {}", unit_path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} does not exist", unit_path.display())
            }
            Err(err) => self.tolerate(
                anyhow::Error::new(err)
                    .context(format!("Failed to remove {}", unit_path.display())),
            )?,
        }

        self.step("systemctl", &["daemon-reload"])?;

        writeln!(self.out, "OK Done")?;
        writeln!(self.out)?;

        Ok(())
    }

    // A query that fails or cannot run counts as "not enabled".
    fn is_enabled(&mut self) -> bool {
        let service_name = self.settings.service_name.as_str();

        match self.runner.run("systemctl", &["is-enabled", service_name]) {
            Ok(output) => output.success(),
            Err(err) => {
                log::debug!("Could not query state of {service_name}: {err}");
                false
            }
        }
    }

    fn write_unit(&mut self, unit: &str) -> anyhow::Result<()> {
        let unit_dir = &self.settings.unit_dir;
        let unit_path = self.settings.unit_path();

        let mut file = tempfile::NamedTempFile::new_in(unit_dir)
            .with_context(|| format!("Failed to create a file in {}", unit_dir.display()))?;
        file.write_all(unit.as_bytes())?;

        file.persist(&unit_path)
            .map_err(|err| err.error)
            .with_context(|| format!("Failed to move unit file to {}", unit_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&unit_path, fs::Permissions::from_mode(0o644))?;
        }

        log::debug!("Wrote {}", unit_path.display());

        Ok(())
    }

    fn ensure_keypair(&mut self, key_path: &str) -> anyhow::Result<()> {
        let settings = self.settings;
        let public_key_path = settings.public_key_path();

        if public_key_path.exists() {
            writeln!(self.out, "OK - {} exists", public_key_path.display())?;
            return Ok(());
        }

        writeln!(self.out, "Generating root SSH keys ...")?;

        if let Some(parent) = settings.ssh_key.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                self.tolerate(
                    anyhow::Error::new(err)
                        .context(format!("Failed to create {}", parent.display())),
                )?;
            }
        }

        self.step(
            "ssh-keygen",
            &["-b", "2048", "-t", "rsa", "-f", key_path, "-q", "-N", ""],
        )?;

        writeln!(self.out, "DONE")?;

        Ok(())
    }

    fn read_public_key(&mut self) -> anyhow::Result<Option<String>> {
        let public_key_path = self.settings.public_key_path();

        match fs::read_to_string(&public_key_path) {
            Ok(key) => Ok(Some(key)),
            Err(err) => {
                self.tolerate(
                    anyhow::Error::new(err)
                        .context(format!("Failed to read {}", public_key_path.display())),
                )?;
                Ok(None)
            }
        }
    }

    /// Runs one external step and prints what it emitted.
    fn step(&mut self, program: &str, args: &[&str]) -> anyhow::Result<()> {
        let command = display_command(program, args);

        let failure = match self.runner.run(program, args) {
            Ok(output) => {
                self.out.write_all(output.stdout.as_bytes())?;
                self.out.write_all(output.stderr.as_bytes())?;

                match output.code {
                    Some(0) => return Ok(()),
                    Some(code) => anyhow::anyhow!("`{command}` exited with status {code}"),
                    None => anyhow::anyhow!("`{command}` was terminated by a signal"),
                }
            }
            Err(err) => anyhow::Error::new(err).context(format!("Failed to run `{command}`")),
        };

        self.tolerate(failure)
    }

    fn tolerate(&self, err: anyhow::Error) -> anyhow::Result<()> {
        if self.settings.strict {
            return Err(err);
        }

        log::warn!("{err:#}");
        Ok(())
    }
}
