use web_sys::{HtmlInputElement, HtmlSelectElement};
use workout_tracker_lib::{validation::WorkoutForm as FormValues, workout::WorkoutType};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct WorkoutFormProps {
    pub on_submit: Callback<FormValues>,
}

/// Shown after a map click. Unmounting it clears the inputs.
#[function_component]
pub fn WorkoutForm(props: &WorkoutFormProps) -> Html {
    let values = use_state(|| FormValues::new(WorkoutType::Running));
    let distance_ref = use_node_ref();

    {
        let distance_ref = distance_ref.clone();
        use_effect_with((), move |_| {
            if let Some(input) = distance_ref.cast::<HtmlInputElement>() {
                let _ = input.focus();
            }
        });
    }

    let on_type_change = {
        let values = values.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Ok(workout_type) = select.value().parse::<WorkoutType>() {
                values.set(FormValues { workout_type, ..(*values).clone() });
            }
        })
    };

    let on_input = |update: fn(&mut FormValues, String)| {
        let values = values.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*values).clone();
            update(&mut next, input.value());
            values.set(next);
        })
    };

    let on_submit = {
        let values = values.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit((*values).clone());
        })
    };

    let is_running = values.workout_type == WorkoutType::Running;
    let row_class = |visible: bool| classes!("form__row", (!visible).then_some("form__row--hidden"));

    html! {
        <form class="form" onsubmit={on_submit}>
            <div class="form__row">
                <label class="form__label">{"Type"}</label>
                <select class="form__input form__input--type" onchange={on_type_change}>
                    <option value="running" selected={is_running}>{"Running"}</option>
                    <option value="cycling" selected={!is_running}>{"Cycling"}</option>
                </select>
            </div>
            <div class="form__row">
                <label class="form__label">{"Distance"}</label>
                <input
                    ref={distance_ref}
                    class="form__input form__input--distance"
                    placeholder="km"
                    value={values.distance.clone()}
                    oninput={on_input(|v, s| v.distance = s)}
                />
            </div>
            <div class="form__row">
                <label class="form__label">{"Duration"}</label>
                <input
                    class="form__input form__input--duration"
                    placeholder="min"
                    value={values.duration.clone()}
                    oninput={on_input(|v, s| v.duration = s)}
                />
            </div>
            <div class={row_class(is_running)}>
                <label class="form__label">{"Cadence"}</label>
                <input
                    class="form__input form__input--cadence"
                    placeholder="step/min"
                    value={values.cadence.clone()}
                    oninput={on_input(|v, s| v.cadence = s)}
                />
            </div>
            <div class={row_class(!is_running)}>
                <label class="form__label">{"Elev Gain"}</label>
                <input
                    class="form__input form__input--elevation"
                    placeholder="meters"
                    value={values.elevation.clone()}
                    oninput={on_input(|v, s| v.elevation = s)}
                />
            </div>
            <button class="form__btn">{"OK"}</button>
        </form>
    }
}
