use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ViewOpened(query) => {
            state.open(query.clone());
            vec![Effect::FetchRecords(query), Effect::ConnectLive]
        }
        Msg::ViewClosed => {
            if state.close() {
                vec![Effect::DisconnectLive]
            } else {
                Vec::new()
            }
        }
        Msg::RefreshRequested => state
            .begin_refresh()
            .map(Effect::FetchRecords)
            .into_iter()
            .collect(),
        Msg::RecordsLoaded(records) => {
            state.load(records);
            Vec::new()
        }
        Msg::RecordsFailed { view, message } => {
            state.fail_load(view, &message);
            Vec::new()
        }
        Msg::SearchChanged(term) => {
            state.with_active_list(|list| list.set_search(term));
            Vec::new()
        }
        Msg::FilterChanged { field, filter } => {
            state.with_active_list(|list| list.set_category(&field, filter));
            Vec::new()
        }
        Msg::FilterValueToggled { field, value } => {
            state.with_active_list(|list| list.toggle_category_value(&field, &value));
            Vec::new()
        }
        Msg::FiltersCleared => {
            state.with_active_list(|list| list.clear_filters());
            Vec::new()
        }
        Msg::SortClicked(field) => {
            state.with_active_list(|list| list.select_sort(&field));
            Vec::new()
        }
        Msg::PageRequested(page_number) => {
            state.with_active_list(|list| list.go_to_page(page_number));
            Vec::new()
        }
        Msg::NextPage => {
            state.with_active_list(|list| list.next_page());
            Vec::new()
        }
        Msg::PreviousPage => {
            state.with_active_list(|list| list.previous_page());
            Vec::new()
        }
        Msg::PageSizeChanged(page_size) => {
            state.with_active_list(|list| list.set_page_size(page_size));
            Vec::new()
        }
        Msg::StatusUpdated { event, received_at } => {
            state.merge_status(&event, received_at);
            Vec::new()
        }
        Msg::ConnectionChanged(connection) => {
            state.set_connection(connection);
            Vec::new()
        }
        Msg::CrudRequested(request) => {
            state.begin_crud();
            vec![Effect::Perform(request)]
        }
        Msg::CrudFinished { request, result } => {
            state.finish_crud();
            match result {
                // Every successful write is followed by a full refetch.
                Ok(()) => state
                    .begin_refresh()
                    .map(Effect::FetchRecords)
                    .into_iter()
                    .collect(),
                Err(message) => {
                    state.set_banner(format!("Failed to {}: {message}", request.describe()));
                    Vec::new()
                }
            }
        }
        Msg::BannerDismissed => {
            state.clear_banner();
            Vec::new()
        }
    };

    (state, effects)
}
