use crate::error::FxError;
use crate::host::{Element, EventKind, Host, HostEvent, Target};

pub const BUTTON_SELECTOR: &str = ".btn";

pub fn is_activation_key(event: &HostEvent) -> bool {
    matches!(event.key.as_deref(), Some("Enter") | Some(" "))
}

/// Lets Enter and Space activate every `.btn` like a pointer click.
pub fn mount<H: Host>(host: &H) -> Result<usize, FxError> {
    let buttons = host.query_all(BUTTON_SELECTOR);
    for button in &buttons {
        let target = button.clone();
        host.listen(
            Target::Element(button),
            EventKind::KeyDown,
            Box::new(move |event: &HostEvent| {
                if is_activation_key(event) {
                    event.prevent_default();
                    target.click();
                }
            }),
        )?;
    }
    Ok(buttons.len())
}
