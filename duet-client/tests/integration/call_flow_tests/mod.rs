mod test_peer_failure_stays_local;
mod test_two_party_call;
