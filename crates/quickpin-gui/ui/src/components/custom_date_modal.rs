use quickpin_shared::CustomDate;
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Html,
  InputEvent,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct CustomDateModalProps {
  pub draft:     CustomDate,
  pub on_change: Callback<CustomDate>,
  pub on_apply:  Callback<()>,
  pub on_close:  Callback<()>
}

#[derive(Clone, Copy)]
enum Field {
  Year,
  Month,
  Day
}

/// Year/month/day entry. Fields accept digits only; "Set" stays disabled
/// until the three fields name a real date.
#[function_component(CustomDateModal)]
pub fn custom_date_modal(
  props: &CustomDateModalProps
) -> Html {
  let field_input = |field: Field| {
    let draft = props.draft.clone();
    let on_change =
      props.on_change.clone();
    move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      let mut next = draft.clone();
      match field {
        | Field::Year => {
          next.set_year(&input.value())
        }
        | Field::Month => {
          next.set_month(&input.value())
        }
        | Field::Day => {
          next.set_day(&input.value())
        }
      }
      // Filtering can leave the draft unchanged; write the cleaned text
      // back so rejected characters disappear.
      input.set_value(match field {
        | Field::Year => next.year(),
        | Field::Month => next.month(),
        | Field::Day => next.day()
      });
      on_change.emit(next);
    }
  };

  let valid = props.draft.is_valid();
  let close_overlay = {
    let cb = props.on_close.clone();
    move |_| cb.emit(())
  };
  let close_button = {
    let cb = props.on_close.clone();
    move |_| cb.emit(())
  };
  let apply = {
    let cb = props.on_apply.clone();
    move |_| cb.emit(())
  };

  html! {
      <div class="modal-overlay" onclick={close_overlay}>
          <div class="date-input-modal" onclick={|e: yew::MouseEvent| e.stop_propagation()}>
              <h3 class="modal-title">{ "Enter a date" }</h3>
              <div class="modal-hint">{ "Type the year, month and day." }</div>
              <div class="modal-fields">
                  <input
                      type="text"
                      placeholder="yyyy"
                      maxlength="4"
                      class="year-field"
                      value={props.draft.year().to_string()}
                      oninput={field_input(Field::Year)}
                  />
                  <span>{ "/" }</span>
                  <input
                      type="text"
                      placeholder="mm"
                      maxlength="2"
                      value={props.draft.month().to_string()}
                      oninput={field_input(Field::Month)}
                  />
                  <span>{ "/" }</span>
                  <input
                      type="text"
                      placeholder="dd"
                      maxlength="2"
                      value={props.draft.day().to_string()}
                      oninput={field_input(Field::Day)}
                  />
              </div>
              <div class="modal-buttons">
                  <button class="modal-btn" onclick={close_button}>{ "Cancel" }</button>
                  <button class="modal-btn modal-btn-primary" disabled={!valid} onclick={apply}>
                      { "Set" }
                  </button>
              </div>
          </div>
      </div>
  }
}
