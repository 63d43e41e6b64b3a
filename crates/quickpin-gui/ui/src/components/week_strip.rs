use chrono::NaiveDate;
use quickpin_shared::WeekDay;
use quickpin_shared::calendar::{
  is_other_date,
  other_date_label,
  week_label
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
pub struct WeekStripProps {
  pub days:           Vec<WeekDay>,
  pub week_offset:    i32,
  pub selected:       Option<NaiveDate>,
  pub on_shift_week:  Callback<i32>,
  pub on_select:
    Callback<Option<NaiveDate>>,
  pub on_open_custom: Callback<()>
}

#[function_component(WeekStrip)]
pub fn week_strip(
  props: &WeekStripProps
) -> Html {
  let prev = {
    let cb = props.on_shift_week.clone();
    move |_| cb.emit(-1)
  };
  let next = {
    let cb = props.on_shift_week.clone();
    move |_| cb.emit(1)
  };
  let other_active = is_other_date(
    props.selected,
    &props.days
  );
  let open_custom = {
    let cb =
      props.on_open_custom.clone();
    move |_| cb.emit(())
  };
  let clear_date = {
    let cb = props.on_select.clone();
    move |_| cb.emit(None)
  };

  html! {
      <div class="date-selector-wrapper">
          <div class="week-navigator">
              <button class="week-nav-button" onclick={prev}>{ "◀" }</button>
              <span class="week-label">{ week_label(props.week_offset) }</span>
              <button class="week-nav-button" onclick={next}>{ "▶" }</button>
          </div>
          <div class="date-selector">
              {
                  for props.days.iter().map(|day| {
                      let date = day.date;
                      let on_select = props.on_select.clone();
                      let class = classes!(
                          "date-button",
                          (props.selected == Some(date)).then_some("active"),
                          day.is_today.then_some("today-date"),
                          day.is_sunday.then_some("sunday-date"),
                          day.is_saturday.then_some("saturday-date")
                      );
                      html! {
                          <button class={class} onclick={move |_| on_select.emit(Some(date))}>
                              <span class="day-name">{ &day.name }</span>
                              <span class="date-num">{ format!("({})", day.month_day) }</span>
                          </button>
                      }
                  })
              }
          </div>
          <div class="date-options">
              <button
                  class={classes!("date-button", other_active.then_some("active"))}
                  onclick={open_custom}
              >
                  { other_date_label(props.selected, &props.days) }
              </button>
              <button
                  class={classes!("date-button", props.selected.is_none().then_some("active"))}
                  onclick={clear_date}
              >
                  { "No date" }
              </button>
          </div>
      </div>
  }
}
