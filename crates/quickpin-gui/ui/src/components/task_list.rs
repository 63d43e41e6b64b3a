use quickpin_shared::{
  TaskId,
  TaskRow
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskListRow;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub title:        &'static str,
  pub empty_text:   &'static str,
  pub rows:         Vec<TaskRow>,
  pub on_primary:   Callback<TaskId>,
  pub on_secondary: Callback<TaskId>,
  #[prop_or_default]
  pub on_edit:      Option<Callback<TaskId>>
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  html! {
      <div class="task-section">
          <h2 class="section-title">{ props.title }</h2>
          <ul class="task-list">
              {
                  for props.rows.iter().cloned().map(|row| html! {
                      <TaskListRow
                          key={row.task.id.to_string()}
                          row={row.clone()}
                          on_primary={props.on_primary.clone()}
                          on_secondary={props.on_secondary.clone()}
                          on_edit={props.on_edit.clone()}
                      />
                  })
              }
              {
                  if props.rows.is_empty() {
                      html! { <li class="empty-message">{ props.empty_text }</li> }
                  } else {
                      html! {}
                  }
              }
          </ul>
      </div>
  }
}
