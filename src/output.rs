use console::style;

fn dim(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).dim()
}

fn magenta_bold(text: impl std::fmt::Display) -> console::StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📡 pipeline-pulse"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Azure DevOps status feed")
    );
}
