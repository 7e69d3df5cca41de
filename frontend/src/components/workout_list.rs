use std::rc::Rc;

use web_sys::HtmlInputElement;
use workout_tracker_lib::workout::{Field, Workout, WorkoutId, WorkoutKind};
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub id: WorkoutId,
    pub field: Field,
    pub value: String,
}

#[derive(Properties, PartialEq)]
pub struct WorkoutListProps {
    /// Already in display order
    pub workouts: Rc<Vec<Workout>>,
    /// Changes after every edit attempt, so rows re-apply the stored values
    /// even when a rejected edit left the workout unchanged.
    pub revision: u32,
    pub on_edit: Callback<FieldEdit>,
    pub on_delete: Callback<WorkoutId>,
    pub on_select: Callback<WorkoutId>,
}

#[function_component]
pub fn WorkoutList(props: &WorkoutListProps) -> Html {
    html! {
        for props.workouts.iter().map(|workout| html! {
            <WorkoutRow
                key={workout.id().as_str()}
                workout={workout.clone()}
                revision={props.revision}
                on_edit={props.on_edit.clone()}
                on_delete={props.on_delete.clone()}
                on_select={props.on_select.clone()}
            />
        })
    }
}

#[derive(Properties, PartialEq)]
struct WorkoutRowProps {
    workout: Workout,
    revision: u32,
    on_edit: Callback<FieldEdit>,
    on_delete: Callback<WorkoutId>,
    on_select: Callback<WorkoutId>,
}

#[function_component]
fn WorkoutRow(props: &WorkoutRowProps) -> Html {
    let workout = &props.workout;
    let id = workout.id().clone();

    let on_select = {
        let id = id.clone();
        let on_select = props.on_select.clone();
        Callback::from(move |_: MouseEvent| on_select.emit(id.clone()))
    };

    let on_delete = {
        let id = id.clone();
        let on_delete = props.on_delete.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_delete.emit(id.clone());
        })
    };

    let editable = |field: Field, value: f64, unit: &'static str, icon: &'static str| {
        let id = id.clone();
        let on_edit = props.on_edit.clone();
        let onchange = Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_edit.emit(FieldEdit { id: id.clone(), field, value: input.value() });
        });

        html! {
            <div class="workout__details">
                <span class="workout__icon">{icon}</span>
                <input class={classes!("workout__value", format!("{}__value", field.name()))} value={value.to_string()} {onchange} />
                <span class="workout__unit">{unit}</span>
            </div>
        }
    };

    let derived = |name: &'static str, value: f64, unit: &'static str| html! {
        <div class="workout__details">
            <span class="workout__icon">{"⚡️"}</span>
            <input class={classes!("workout__value", format!("{name}__value"))} value={format!("{value:.1}")} readonly={true} />
            <span class="workout__unit">{unit}</span>
        </div>
    };

    let kind_details = match *workout.kind() {
        WorkoutKind::Running { cadence, pace } => html! { <>
            {derived("pace", pace, "min/km")}
            {editable(Field::Cadence, cadence, "spm", "🦶🏼")}
        </> },
        WorkoutKind::Cycling { elevation_gain, speed } => html! { <>
            {derived("speed", speed, "km/h")}
            {editable(Field::ElevationGain, elevation_gain, "m", "⛰")}
        </> },
    };

    let workout_type = workout.workout_type();

    html! {
        <li
            class={classes!("workout", format!("workout--{}", workout_type.label()))}
            data-id={id.to_string()}
            title={workout.date().format("%d/%m/%Y %H:%M").to_string()}
            onclick={on_select}
        >
            <h2 class="workout__title">
                {workout.description()}
                <span class="workout__delete" onclick={on_delete}>{"X"}</span>
            </h2>
            {editable(Field::Distance, workout.distance(), "km", workout_type.emoji())}
            {editable(Field::Duration, workout.duration(), "min", "⏱")}
            {kind_details}
        </li>
    }
}
