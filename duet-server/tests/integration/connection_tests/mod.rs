mod test_join_is_not_forwarded;
mod test_malformed_frame_keeps_connection;
