use anyhow::Context;
use rust_embed::Embed;

use crate::forward::{PortForward, Target};

#[derive(Embed)]
#[folder = "assets"]
struct Assets;

const TEMPLATE_FILE: &str = "autossh-tunnel.service";

/// Marker in the template replaced by the autossh forwarding arguments.
pub(crate) const PLACEHOLDER: &str = "[PLACEHOLDER]";

pub(crate) fn default_template() -> anyhow::Result<String> {
    let file = Assets::get(TEMPLATE_FILE).context("Unit template is missing from the binary")?;

    Ok(String::from_utf8(file.data.into_owned())?)
}

/// Renders the unit file: every forward as `-R ext:localhost:int`, in order,
/// then the target as last argument of `ExecStart`.
pub(crate) fn render_unit(template: &str, forwards: &[PortForward], target: &Target) -> String {
    let mut arguments = forwards
        .iter()
        .map(PortForward::remote_flag)
        .collect::<Vec<_>>();
    arguments.push(target.to_string());

    template.replace(PLACEHOLDER, &arguments.join(" "))
}
