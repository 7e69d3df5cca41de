use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ErrorPanelProps {
    pub message: Option<AttrValue>,
    pub on_dismiss: Callback<()>,
}

/// Hidden while there is no message. Clicking it dismisses the message.
#[function_component]
pub fn ErrorPanel(props: &ErrorPanelProps) -> Html {
    let on_dismiss = props.on_dismiss.clone();
    let onclick = Callback::from(move |_| on_dismiss.emit(()));

    html! {
        <div class={classes!("error__message", props.message.is_none().then_some("hidden"))} {onclick}>
            if let Some(message) = &props.message {
                <p>{message.clone()}</p>
            }
            <span class="error__hint">{"Click to dismiss"}</span>
        </div>
    }
}
