use quickpin_shared::{
  TaskId,
  TaskRow,
  Urgency
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub row:          TaskRow,
  pub on_primary:   Callback<TaskId>,
  pub on_secondary: Callback<TaskId>,
  pub on_edit:      Option<Callback<TaskId>>
}

/// Left click toggles (or cancels an armed delete), right click arms or
/// deletes.
#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let row = &props.row;
  let id = row.task.id;

  let class = classes!(
    "task-item",
    row.task.is_done.then_some("done"),
    match row.urgency {
      | Urgency::Overdue => {
        Some("overdue")
      }
      | Urgency::DueSoon => {
        Some("due-soon")
      }
      | Urgency::Normal => None
    },
    row.pending_delete
      .then_some("pending-delete")
  );

  let on_primary =
    props.on_primary.clone();
  let on_secondary =
    props.on_secondary.clone();

  let content = if row.pending_delete {
    "Right-click to delete / click to \
     cancel"
      .to_string()
  } else {
    row.task.title.clone()
  };

  html! {
      <li
          class={class}
          data-pending-id={row.pending_delete.then(|| id.to_string())}
          onclick={move |_| on_primary.emit(id)}
          oncontextmenu={move |e: yew::MouseEvent| {
              e.prevent_default();
              on_secondary.emit(id);
          }}
      >
          <div class="task-main">
              <span class="task-content">{ content }</span>
          </div>
          {
              match row.due_label() {
                  Some(label) => html! {
                      <time class={classes!("task-due-date", row.due_today.then_some("due-today"))}>
                          { label }
                      </time>
                  },
                  None => html! {},
              }
          }
          {
              match props.on_edit.clone() {
                  Some(on_edit) => html! {
                      <button
                          class="edit-button"
                          title="Edit"
                          onclick={move |e: yew::MouseEvent| {
                              e.stop_propagation();
                              on_edit.emit(id);
                          }}
                      >
                          { "✎" }
                      </button>
                  },
                  None => html! {},
              }
          }
      </li>
  }
}
