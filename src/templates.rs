use crate::inventory::host::Host;
use crate::inventory::migration::{MigrationEntry, MigrationStatus};
use std::fmt::Write;

pub struct ServersContext<'a> {
    pub title: &'a str,
    pub hosts: &'a [Host],
}

pub struct StretchUpgradeContext<'a> {
    pub title: &'a str,
    pub servers: &'a [MigrationEntry],
    pub blocked: MigrationStatus,
    pub upgraded: MigrationStatus,
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
        body = body
    )
}

fn host_row(out: &mut String, host: &Host, depth: usize) -> std::fmt::Result {
    let munin = if host.has_munin() {
        format!(
            "<a href=\"https://munin.ocf.berkeley.edu/ocf.berkeley.edu/{0}.ocf.berkeley.edu/\">{0}</a>",
            escape(&host.hostname)
        )
    } else {
        String::new()
    };

    writeln!(
        out,
        "<tr class=\"depth-{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        depth,
        escape(&host.hostname),
        host.english_type(),
        escape(&host.description),
        escape(host.ipv4().unwrap_or("")),
        escape(host.ipv6().unwrap_or("")),
        munin
    )?;

    for child in &host.children {
        host_row(out, child, depth + 1)?;
    }

    Ok(())
}

pub fn servers(context: &ServersContext<'_>) -> Result<String, std::fmt::Error> {
    let mut body = String::new();
    writeln!(
        body,
        "<table>\n<tr><th>Hostname</th><th>Type</th><th>Description</th><th>IPv4</th><th>IPv6</th><th>Munin</th></tr>"
    )?;
    for host in context.hosts {
        host_row(&mut body, host, 0)?;
    }
    writeln!(body, "</table>")?;

    Ok(page(context.title, &body))
}

pub fn stretch_upgrade(context: &StretchUpgradeContext<'_>) -> Result<String, std::fmt::Error> {
    let mut body = String::new();
    writeln!(
        body,
        "<table>\n<tr><th>Host</th><th>Status</th><th>Dev host</th><th>Comments</th></tr>"
    )?;

    for entry in context.servers {
        let class = if entry.status == context.upgraded {
            "upgraded"
        } else if entry.status == context.blocked {
            "blocked"
        } else {
            "needs-upgrade"
        };

        writeln!(
            body,
            "<tr class=\"{}\" data-status=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            class,
            entry.status.value(),
            escape(&entry.host.hostname),
            entry.status.label(),
            if entry.has_dev { "yes" } else { "no" },
            escape(entry.comments.as_deref().unwrap_or(""))
        )?;
    }
    writeln!(body, "</table>")?;

    let upgraded = context
        .servers
        .iter()
        .filter(|e| e.status == context.upgraded)
        .count();
    writeln!(
        body,
        "<p>{} of {} hosts upgraded.</p>",
        upgraded,
        context.servers.len()
    )?;

    Ok(page(context.title, &body))
}
