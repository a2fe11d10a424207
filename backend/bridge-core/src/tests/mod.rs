mod connection_state;
mod failure_kind;
mod reply_classify;
